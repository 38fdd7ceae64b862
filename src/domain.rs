pub mod entities {
    pub mod contact;
}

pub mod use_cases {
    pub mod contact;
}
