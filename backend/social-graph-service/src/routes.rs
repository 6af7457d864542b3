//! Route configuration
//!
//! Everything under `/api` except `/api/health` runs behind `JwtAuthMiddleware`.
//! Within a scope, literal segments are registered before `{id}` captures.

use crate::handlers;
use crate::middleware::JwtAuthMiddleware;
use actix_web::{web, HttpResponse};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics_handler)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health::health_check))
            .configure(routes::me::configure)
            .configure(routes::profile::configure)
            .configure(routes::post::configure)
            .configure(routes::comment::configure)
            .configure(routes::like::configure)
            .configure(routes::bookmark::configure)
            .configure(routes::follow::configure)
            .configure(routes::block::configure)
            .configure(routes::message::configure)
            .configure(routes::notification::configure)
            .configure(routes::dating::configure)
            .configure(routes::interaction::configure)
            .configure(routes::recommendation::configure),
    );
}

async fn metrics_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(crate::metrics::gather_metrics())
}

mod routes {
    use super::*;

    pub mod me {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/me")
                    .wrap(JwtAuthMiddleware)
                    .route("", web::get().to(handlers::profile::me)),
            );
        }
    }

    pub mod profile {
        use super::*;
        use crate::handlers::profile as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/profile")
                    .wrap(JwtAuthMiddleware)
                    .route("/me", web::get().to(h::get_own_profile))
                    .route("/me", web::put().to(h::update_own_profile))
                    .route("/search", web::get().to(h::search_profiles))
                    .route("/{user_id}", web::get().to(h::get_profile))
                    .route("/{user_id}/location", web::put().to(h::update_location)),
            );
        }
    }

    pub mod post {
        use super::*;
        use crate::handlers::posts as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/post")
                    .wrap(JwtAuthMiddleware)
                    .route("", web::post().to(h::create_post))
                    .route("/feed", web::get().to(h::get_feed))
                    .route("/search", web::get().to(h::search_posts))
                    .route("/user/{user_id}", web::get().to(h::get_user_posts))
                    .route("/{post_id}", web::get().to(h::get_post))
                    .route("/{post_id}", web::put().to(h::update_post))
                    .route("/{post_id}", web::delete().to(h::delete_post))
                    .route("/{post_id}/view", web::post().to(h::record_view))
                    .route("/{post_id}/share", web::post().to(h::record_share)),
            );
        }
    }

    pub mod comment {
        use super::*;
        use crate::handlers::comments as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/comment")
                    .wrap(JwtAuthMiddleware)
                    .route("/post/{post_id}", web::post().to(h::create_comment))
                    .route("/post/{post_id}", web::get().to(h::get_post_comments))
                    .route("/user/{user_id}", web::get().to(h::get_user_comments))
                    .route("/{comment_id}", web::get().to(h::get_comment))
                    .route("/{comment_id}", web::put().to(h::update_comment))
                    .route("/{comment_id}", web::delete().to(h::delete_comment)),
            );
        }
    }

    pub mod like {
        use super::*;
        use crate::handlers::likes as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/like")
                    .wrap(JwtAuthMiddleware)
                    .route("/post/{post_id}", web::post().to(h::like_post))
                    .route("/post/{post_id}", web::delete().to(h::unlike_post))
                    .route("/post/{post_id}/users", web::get().to(h::get_post_likers))
                    .route("/post/{post_id}/check", web::get().to(h::has_liked))
                    .route("/user/{user_id}/posts", web::get().to(h::get_user_liked_posts))
                    .route("/comment/{comment_id}", web::post().to(h::like_comment))
                    .route("/comment/{comment_id}", web::delete().to(h::unlike_comment)),
            );
        }
    }

    pub mod bookmark {
        use super::*;
        use crate::handlers::{bookmarks as h, collections as c};
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/bookmark")
                    .wrap(JwtAuthMiddleware)
                    .route("/post/{post_id}", web::post().to(h::bookmark_post))
                    .route("/post/{post_id}", web::delete().to(h::remove_bookmark))
                    .route("/post/{post_id}/check", web::get().to(h::is_bookmarked))
                    .route("/user/{user_id}/posts", web::get().to(h::get_bookmarked_posts))
                    .service(
                        web::scope("/collection")
                            .route("", web::post().to(c::create_collection))
                            .route("/user/{user_id}", web::get().to(c::get_user_collections))
                            .route("/{collection_id}", web::get().to(c::get_collection))
                            .route("/{collection_id}", web::put().to(c::update_collection))
                            .route("/{collection_id}", web::delete().to(c::delete_collection))
                            .route(
                                "/{collection_id}/bookmark/{bookmark_id}",
                                web::post().to(c::add_bookmark),
                            )
                            .route(
                                "/{collection_id}/bookmark/{bookmark_id}",
                                web::delete().to(c::remove_bookmark),
                            )
                            .route(
                                "/{collection_id}/bookmarks",
                                web::get().to(c::get_collection_bookmarks),
                            ),
                    ),
            );
        }
    }

    pub mod follow {
        use super::*;
        use crate::handlers::follows as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/follow")
                    .wrap(JwtAuthMiddleware)
                    .route("/requests", web::get().to(h::get_pending_requests))
                    .route("/request/{requester_id}/accept", web::post().to(h::accept_follow_request))
                    .route("/request/{requester_id}/deny", web::post().to(h::deny_follow_request))
                    .route("/user/{user_id}", web::post().to(h::follow_user))
                    .route("/user/{user_id}", web::delete().to(h::unfollow_user))
                    .route("/user/{user_id}/followers", web::get().to(h::get_followers))
                    .route("/user/{user_id}/following", web::get().to(h::get_following))
                    .route("/user/{user_id}/mutual", web::get().to(h::get_mutual_followers)),
            );
        }
    }

    pub mod block {
        use super::*;
        use crate::handlers::blocks as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/block")
                    .wrap(JwtAuthMiddleware)
                    .route("/user/{user_id}", web::post().to(h::block_user))
                    .route("/user/{user_id}", web::delete().to(h::unblock_user))
                    .route("/user/{user_id}/blocked", web::get().to(h::get_blocked_users))
                    .route("/check/{user_id}", web::get().to(h::is_blocked)),
            );
        }
    }

    pub mod message {
        use super::*;
        use crate::handlers::messages as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/message")
                    .wrap(JwtAuthMiddleware)
                    .route("", web::post().to(h::send_message))
                    .route("/conversation/{user_id}", web::get().to(h::get_conversation))
                    .route("/{message_id}", web::delete().to(h::delete_message))
                    .route("/{message_id}/reaction", web::post().to(h::react_to_message)),
            );
        }
    }

    pub mod notification {
        use super::*;
        use crate::handlers::notifications as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/notification")
                    .wrap(JwtAuthMiddleware)
                    .route("", web::get().to(h::list_notifications))
                    .route("/{notification_id}/read", web::put().to(h::mark_read)),
            );
        }
    }

    pub mod dating {
        use super::*;
        use crate::handlers::dating as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/dating")
                    .wrap(JwtAuthMiddleware)
                    .route("/profile", web::post().to(h::create_dating_profile))
                    .route("/profile/{user_id}", web::get().to(h::get_dating_profile))
                    .route("/profile/{user_id}", web::put().to(h::update_dating_profile))
                    .route("/profile/{user_id}/view", web::post().to(h::record_profile_view))
                    .route("/matches", web::get().to(h::get_potential_matches))
                    .route("/matches/mutual", web::get().to(h::get_mutual_matches))
                    .route("/action/{target_id}", web::post().to(h::record_dating_action)),
            );
        }
    }

    pub mod interaction {
        use super::*;
        use crate::handlers::interactions as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/interaction")
                    .wrap(JwtAuthMiddleware)
                    .route("/video/{post_id}", web::post().to(h::record_video_interaction))
                    .route("/profile/{user_id}", web::post().to(h::record_profile_view))
                    .route("/user/{user_id}", web::post().to(h::record_interaction))
                    .route("/similarity/{user_id}", web::get().to(h::calculate_user_similarity)),
            );
        }
    }

    pub mod recommendation {
        use super::*;
        use crate::handlers::recommendations as h;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/recommendation")
                    .wrap(JwtAuthMiddleware)
                    .route("/users", web::get().to(h::user_suggestions))
                    .route("/creators", web::get().to(h::creator_suggestions)),
            );
        }
    }
}
