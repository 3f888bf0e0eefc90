//! HTTP inbound adapter exposing the companion REST API under `/api`.

pub mod actions;
pub mod chats;
pub mod error;
pub mod health;
pub mod launch;
pub mod launch_config;
pub mod profiles;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register every authenticated endpoint under the `/api` scope.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use companion::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(profiles::current_profile)
            .service(profiles::update_bio)
            .service(profiles::get_profile)
            .service(profiles::list_friends)
            .service(profiles::list_requests)
            .service(chats::list_chats)
            .service(chats::read_chat)
            .service(chats::delete_chat)
            .service(chats::send_message)
            .service(chats::react)
            .service(actions::apply_action),
    );
}
