//! Application state shared by every handler

use crate::config::Config;
use crate::db::GraphClient;
use crate::services::{
    analytics::AnalyticsService,
    auth::{AuthService, IdentityProvider},
    block::BlockService,
    bookmark::BookmarkService,
    bookmark_collection::BookmarkCollectionService,
    comment::CommentService,
    dating::DatingService,
    follow::FollowService,
    interaction::InteractionService,
    like::LikeService,
    message::MessageService,
    notification::NotificationService,
    post::PostService,
    profile::ProfileService,
    recommendation::RecommendationService,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub graph: GraphClient,
    pub auth: Arc<AuthService>,
    pub services: Arc<AppServices>,
}

/// Domain services, all sharing one graph client
pub struct AppServices {
    pub profile: ProfileService,
    pub posts: PostService,
    pub comments: CommentService,
    pub likes: LikeService,
    pub bookmarks: BookmarkService,
    pub collections: BookmarkCollectionService,
    pub follows: FollowService,
    pub blocks: BlockService,
    pub messages: MessageService,
    pub notifications: NotificationService,
    pub dating: DatingService,
    pub interactions: InteractionService,
    pub recommendations: RecommendationService,
    pub analytics: AnalyticsService,
}

impl AppServices {
    pub fn new(graph: GraphClient, config: &Config) -> Self {
        let candidate_limit = config.ranking.candidate_limit;
        let notifications = NotificationService::new(graph.clone());
        let interactions = InteractionService::new(graph.clone());

        Self {
            profile: ProfileService::new(graph.clone(), candidate_limit),
            posts: PostService::new(graph.clone(), notifications.clone(), candidate_limit),
            comments: CommentService::new(graph.clone(), notifications.clone()),
            likes: LikeService::new(graph.clone(), notifications.clone()),
            bookmarks: BookmarkService::new(graph.clone()),
            collections: BookmarkCollectionService::new(graph.clone()),
            follows: FollowService::new(graph.clone(), notifications.clone()),
            blocks: BlockService::new(graph.clone()),
            messages: MessageService::new(graph.clone(), notifications.clone()),
            dating: DatingService::new(graph.clone(), interactions.clone(), candidate_limit),
            recommendations: RecommendationService::new(graph.clone(), candidate_limit),
            analytics: AnalyticsService::new(graph),
            interactions,
            notifications,
        }
    }
}

impl AppState {
    pub fn new(config: Config, graph: GraphClient, provider: Arc<dyn IdentityProvider>) -> Self {
        let auth = AuthService::new(provider, &config.auth, graph.clone());
        let services = AppServices::new(graph.clone(), &config);

        Self {
            config: Arc::new(config),
            graph,
            auth: Arc::new(auth),
            services: Arc::new(services),
        }
    }
}
