pub mod handlers {
    pub mod contact;
    pub mod system;
}

pub mod repositories {
    pub mod captcha;
    pub mod memory_repo;
    pub mod rate_limit;
    pub mod redis_repo;
    pub mod relay;
}

pub mod routes;
