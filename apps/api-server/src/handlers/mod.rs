//! HTTP handlers and route configuration.

mod auth;
mod comments;
mod health;
mod posts;
mod tags;


use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Fixed segments are registered ahead of `/{id}`.
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    .route("/mingi", web::get().to(posts::random_post))
                    .route("/likes_three", web::get().to(posts::top_three))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::patch().to(posts::patch_post))
                    .route("/{id}", web::delete().to(posts::delete_post))
                    .route("/{id}/likes", web::get().to(posts::toggle_like))
                    .route("/{id}/comments", web::get().to(posts::list_comments))
                    .route("/{id}/comments", web::post().to(posts::create_comment)),
            )
            .service(
                web::scope("/comments")
                    .route("/{id}", web::get().to(comments::get_comment))
                    .route("/{id}", web::put().to(comments::update_comment))
                    .route("/{id}", web::patch().to(comments::patch_comment))
                    .route("/{id}", web::delete().to(comments::delete_comment)),
            )
            .route("/tags/{tag_name}", web::get().to(tags::posts_by_tag)),
    );
}
