use actix_web::web::{self};

pub mod routes {
    pub mod seed;
    pub mod user;
}

mod services {
    pub(crate) mod seed;
}

mod dtos {
    pub(crate) mod user;
}

pub fn mount_users() -> actix_web::Scope {
    web::scope("/user")
        .service(routes::user::get_status)
        .service(routes::user::post_check_operation)
        .service(routes::user::post_register_operation)
}
pub fn mount_test() -> actix_web::Scope {
    web::scope("/test").service(routes::seed::post_create_users)
}
