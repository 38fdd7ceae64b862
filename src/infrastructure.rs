pub mod captcha {
    pub mod recaptcha;
}

pub mod relay {
    pub mod formsubmit;
}

pub mod db {
    pub mod redis_pool;
}

pub mod utils {
    pub mod get_client_ip;
}

pub mod web {
    pub mod cors;
}
