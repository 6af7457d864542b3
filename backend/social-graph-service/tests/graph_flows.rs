//! End-to-end service flows against a live Neo4j.
//!
//! Run with `cargo test -- --ignored` and a database at `NEO4J_TEST_URI`
//! (default bolt://localhost:7687). Every test provisions fresh users so
//! the suite can share one database.

use async_trait::async_trait;
use chrono::NaiveDate;
use social_graph_service::config::{AppConfig, AuthConfig, Config, Neo4jConfig, RankingSettings};
use social_graph_service::db::GraphClient;
use social_graph_service::domain::comment::CommentCreate;
use social_graph_service::domain::dating::{DatingFilter, DatingProfileCreate, Gender, Sexuality};
use social_graph_service::domain::interaction::InteractionType;
use social_graph_service::domain::message::{MessageCreate, ReactionType};
use social_graph_service::domain::notification::{Notification, NotificationType};
use social_graph_service::domain::post::PostCreate;
use social_graph_service::domain::user::{IdentityProfile, LocationUpdate, ProfileUpdate, User};
use social_graph_service::domain::Pagination;
use social_graph_service::services::auth::{IdentityProvider, JwkSet};
use social_graph_service::{AppError, AppServices, AppState};
use std::sync::Arc;
use uuid::Uuid;

struct OfflineProvider;

#[async_trait]
impl IdentityProvider for OfflineProvider {
    async fn fetch_jwks(&self) -> social_graph_service::Result<JwkSet> {
        Err(AppError::IdentityProvider("offline".into()))
    }

    async fn fetch_profile(&self, _token: &str) -> social_graph_service::Result<IdentityProfile> {
        Err(AppError::IdentityProvider("offline".into()))
    }
}

fn test_config() -> Config {
    Config {
        app: AppConfig {
            env: "test".into(),
            host: "127.0.0.1".into(),
            port: 0,
            cors_allowed_origins: "*".into(),
        },
        neo4j: Neo4jConfig {
            uri: String::new(),
            user: String::new(),
            password: String::new(),
        },
        auth: AuthConfig {
            domain: "tenant.example.com".into(),
            audience: "https://api.example.com".into(),
            jwks_cache_ttl_secs: 60,
        },
        ranking: RankingSettings::default(),
    }
}

async fn state() -> AppState {
    let uri = std::env::var("NEO4J_TEST_URI").unwrap_or_else(|_| "bolt://localhost:7687".into());
    let user = std::env::var("NEO4J_TEST_USER").unwrap_or_else(|_| "neo4j".into());
    let password = std::env::var("NEO4J_TEST_PASSWORD").unwrap_or_else(|_| "password".into());
    let graph = GraphClient::connect(&uri, &user, &password).expect("neo4j connection");
    AppState::new(test_config(), graph, Arc::new(OfflineProvider))
}

async fn user(state: &AppState, nickname: &str) -> User {
    let sub = format!("auth0|{}", Uuid::new_v4());
    state
        .auth
        .get_or_create_user(&IdentityProfile {
            sub,
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            name: Some(nickname.to_string()),
            nickname: Some(nickname.to_string()),
            picture: None,
        })
        .await
        .expect("provision user")
}

fn services(state: &AppState) -> &AppServices {
    &state.services
}

fn message_to(receiver: &User, content: &str) -> MessageCreate {
    MessageCreate {
        receiver_id: receiver.user_id,
        content: content.to_string(),
        shared_post_id: None,
        reply_to_message_id: None,
    }
}

async fn dating_profile(state: &AppState, who: &User, gender: Gender, wants: Gender) {
    state
        .services
        .dating
        .create_dating_profile(
            who.user_id,
            DatingProfileCreate {
                bio: "hello".into(),
                birth_date: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
                gender,
                sexuality: Sexuality::Straight,
                photos: vec![],
                max_distance_miles: 50.0,
                min_age_preference: 18,
                max_age_preference: 60,
                gender_preference: vec![wants],
                is_visible: true,
            },
        )
        .await
        .expect("dating profile");
}

async fn place(state: &AppState, who: &User, latitude: f64, longitude: f64) {
    state
        .services
        .profile
        .update_location(who.user_id, LocationUpdate { latitude, longitude })
        .await
        .expect("location");
}

fn post_payload(title: &str) -> PostCreate {
    PostCreate {
        title: Some(title.to_string()),
        description: Some("graph test".into()),
        hashtags: vec!["test".into()],
        is_private: false,
        allows_comments: true,
        video_s3_key: "videos/test.mp4".into(),
        thumbnail_s3_key: None,
        duration_seconds: 12.0,
    }
}

#[tokio::test]
#[ignore]
async fn follow_then_block_removes_edges_and_counters() {
    let state = state().await;
    let s = services(&state);
    let alice = user(&state, "alice").await;
    let bob = user(&state, "bob").await;

    let outcome = s.follows.follow_user(alice.user_id, bob.user_id).await.unwrap();
    assert!(outcome.is_direct_follow);

    let again = s.follows.follow_user(alice.user_id, bob.user_id).await.unwrap_err();
    assert!(matches!(again, AppError::BadRequest(_)));

    let blocked = s.blocks.block_user(bob.user_id, alice.user_id).await.unwrap();
    assert!(blocked.removed_reverse_follow);
    assert!(!blocked.removed_forward_follow);

    let alice_now = s.profile.get_user(alice.user_id).await.unwrap();
    let bob_now = s.profile.get_user(bob.user_id).await.unwrap();
    assert_eq!(alice_now.following_count, 0);
    assert_eq!(bob_now.follower_count, 0);

    let err = s.follows.follow_user(alice.user_id, bob.user_id).await.unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    assert!(s.blocks.is_blocked(alice.user_id, bob.user_id).await.unwrap());

    let err = s
        .profile
        .get_profile(bob.user_id, Some(alice.user_id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
#[ignore]
async fn private_account_gets_follow_request() {
    let state = state().await;
    let s = services(&state);
    let carol = user(&state, "carol").await;
    let dave = user(&state, "dave").await;

    s.profile
        .update_profile(
            carol.user_id,
            ProfileUpdate {
                is_private: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let outcome = s.follows.follow_user(dave.user_id, carol.user_id).await.unwrap();
    assert!(!outcome.is_direct_follow);

    let pending = s
        .follows
        .get_pending_requests(carol.user_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    s.follows
        .accept_follow_request(carol.user_id, dave.user_id)
        .await
        .unwrap();
    let followers = s
        .follows
        .get_followers(carol.user_id, Pagination::default())
        .await
        .unwrap();
    assert!(followers.iter().any(|u| u.user_id == dave.user_id));

    let err = s
        .follows
        .deny_follow_request(carol.user_id, dave.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
#[ignore]
async fn like_and_comment_counters_track_edges() {
    let state = state().await;
    let s = services(&state);
    let author = user(&state, "author").await;
    let fan = user(&state, "fan").await;

    let post = s
        .posts
        .create_post(author.user_id, post_payload("counting"))
        .await
        .unwrap();

    s.likes.like_post(fan.user_id, post.post_id).await.unwrap();
    let twice = s.likes.like_post(fan.user_id, post.post_id).await.unwrap_err();
    assert!(matches!(twice, AppError::BadRequest(_)));
    assert!(s.likes.has_liked(fan.user_id, post.post_id).await.unwrap());

    let comment = s
        .comments
        .create_comment(
            fan.user_id,
            post.post_id,
            CommentCreate {
                content: format!("nice one @{}", author.username),
                in_reply_to: None,
            },
        )
        .await
        .unwrap();

    let reloaded = s.posts.get_post(post.post_id, fan.user_id).await.unwrap();
    assert_eq!(reloaded.like_count, 1);
    assert_eq!(reloaded.comment_count, 1);

    s.likes.unlike_post(fan.user_id, post.post_id).await.unwrap();
    s.comments
        .delete_comment(comment.comment_id, fan.user_id)
        .await
        .unwrap();
    let reloaded = s.posts.get_post(post.post_id, fan.user_id).await.unwrap();
    assert_eq!(reloaded.like_count, 0);
    assert_eq!(reloaded.comment_count, 0);

    let notifications = s
        .notifications
        .list(author.user_id, true, Pagination::default())
        .await
        .unwrap();
    assert!(!notifications.is_empty());
}

#[tokio::test]
#[ignore]
async fn mutual_swipes_create_one_match() {
    let state = state().await;
    let s = services(&state);
    let erin = user(&state, "erin").await;
    let frank = user(&state, "frank").await;

    for (who, gender, wants) in [
        (&erin, Gender::Female, Gender::Male),
        (&frank, Gender::Male, Gender::Female),
    ] {
        s.dating
            .create_dating_profile(
                who.user_id,
                DatingProfileCreate {
                    bio: "hello".into(),
                    birth_date: NaiveDate::from_ymd_opt(1995, 6, 15).unwrap(),
                    gender,
                    sexuality: Sexuality::Straight,
                    photos: vec![],
                    max_distance_miles: 50.0,
                    min_age_preference: 18,
                    max_age_preference: 60,
                    gender_preference: vec![wants],
                    is_visible: true,
                },
            )
            .await
            .unwrap();
    }

    let first = s
        .dating
        .record_dating_action(erin.user_id, frank.user_id, InteractionType::SwipeRight)
        .await
        .unwrap();
    assert!(first.is_none());

    let matched = s
        .dating
        .record_dating_action(frank.user_id, erin.user_id, InteractionType::SuperLike)
        .await
        .unwrap()
        .expect("match");
    assert!(matched.compatibility_score >= 0.0 && matched.compatibility_score <= 1.0);

    let mutual = s
        .dating
        .get_mutual_matches(erin.user_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(mutual.len(), 1);

    let invalid = s
        .dating
        .record_dating_action(erin.user_id, frank.user_id, InteractionType::Comment)
        .await
        .unwrap_err();
    assert!(matches!(invalid, AppError::BadRequest(_)));
}

#[tokio::test]
#[ignore]
async fn private_or_blocked_receivers_refuse_messages() {
    let state = state().await;
    let s = services(&state);
    let gina = user(&state, "gina").await;
    let hal = user(&state, "hal").await;
    let ivan = user(&state, "ivan").await;

    s.profile
        .update_profile(
            gina.user_id,
            ProfileUpdate {
                is_private: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = s
        .messages
        .send_message(hal.user_id, message_to(&gina, "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    s.blocks.block_user(ivan.user_id, hal.user_id).await.unwrap();
    let err = s
        .messages
        .send_message(hal.user_id, message_to(&ivan, "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
    let err = s
        .messages
        .send_message(ivan.user_id, message_to(&hal, "hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let conversation = s
        .messages
        .get_conversation(hal.user_id, ivan.user_id, Pagination::default())
        .await
        .unwrap();
    assert!(conversation.is_empty());
}

#[tokio::test]
#[ignore]
async fn reacting_again_replaces_the_reaction() {
    let state = state().await;
    let s = services(&state);
    let jo = user(&state, "jo").await;
    let kim = user(&state, "kim").await;

    let message = s
        .messages
        .send_message(jo.user_id, message_to(&kim, "lunch?"))
        .await
        .unwrap();

    s.messages
        .react_to_message(message.message_id, kim.user_id, ReactionType::ThumbsUp)
        .await
        .unwrap();
    let second = s
        .messages
        .react_to_message(message.message_id, kim.user_id, ReactionType::Laugh)
        .await
        .unwrap();
    assert_eq!(second.reaction_type, ReactionType::Laugh);

    let reactions: Vec<String> = state
        .graph
        .fetch_all(
            neo4rs::query(
                "MATCH (:User {user_id: $user_id})-[r:REACTED]->(:Message {message_id: $message_id})
                 RETURN r.reaction AS reaction",
            )
            .param("user_id", kim.user_id.to_string())
            .param("message_id", message.message_id.to_string()),
            "reaction",
        )
        .await
        .unwrap();
    assert_eq!(reactions, vec![ReactionType::Laugh.as_str().to_string()]);

    let outsider = user(&state, "lee").await;
    let err = s
        .messages
        .react_to_message(message.message_id, outsider.user_id, ReactionType::Like)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
#[ignore]
async fn notifications_to_self_are_skipped() {
    let state = state().await;
    let s = services(&state);
    let mo = user(&state, "mo").await;
    let post = s
        .posts
        .create_post(mo.user_id, post_payload("own"))
        .await
        .unwrap();

    let created = s
        .notifications
        .create(&Notification::new(
            NotificationType::LikedPost,
            mo.user_id,
            mo.user_id,
            post.post_id,
        ))
        .await
        .unwrap();
    assert!(created.is_none());

    s.likes.like_post(mo.user_id, post.post_id).await.unwrap();
    let inbox = s
        .notifications
        .list(mo.user_id, false, Pagination::default())
        .await
        .unwrap();
    assert!(inbox.is_empty());
}

#[tokio::test]
#[ignore]
async fn potential_matches_honour_distance_seen_and_threshold() {
    let state = state().await;
    let s = services(&state);
    let seeker = user(&state, "nia").await;
    let near = user(&state, "oscar").await;
    let far = user(&state, "paul").await;
    let seen = user(&state, "quinn").await;

    dating_profile(&state, &seeker, Gender::Female, Gender::Male).await;
    for who in [&near, &far, &seen] {
        dating_profile(&state, who, Gender::Male, Gender::Female).await;
    }

    // A spot of our own so earlier runs do not crowd the page
    let lat = -45.0 + (seeker.user_id.as_u128() % 1000) as f64 / 100.0;
    let lon = 100.0 + (seeker.user_id.as_u128() % 997) as f64 / 100.0;
    place(&state, &seeker, lat, lon).await;
    place(&state, &near, lat + 0.01, lon).await;
    place(&state, &seen, lat, lon + 0.01).await;
    place(&state, &far, lat + 5.0, lon).await;

    s.dating
        .record_dating_action(seeker.user_id, seen.user_id, InteractionType::SwipeLeft)
        .await
        .unwrap();

    let filter = DatingFilter {
        limit: 100,
        ..Default::default()
    };
    let ids = |profiles: &[social_graph_service::domain::dating::ScoredProfile]| {
        profiles.iter().map(|p| p.profile.user_id).collect::<Vec<Uuid>>()
    };

    let results = s
        .dating
        .get_potential_matches(seeker.user_id, filter.clone())
        .await
        .unwrap();
    let found = ids(&results);
    assert!(found.contains(&near.user_id));
    assert!(!found.contains(&far.user_id));
    assert!(!found.contains(&seen.user_id));
    let near_hit = results
        .iter()
        .find(|p| p.profile.user_id == near.user_id)
        .unwrap();
    assert!(near_hit.distance_miles.unwrap() <= filter.max_distance);

    let with_seen = s
        .dating
        .get_potential_matches(
            seeker.user_id,
            DatingFilter {
                exclude_seen: false,
                ..filter.clone()
            },
        )
        .await
        .unwrap();
    assert!(ids(&with_seen).contains(&seen.user_id));

    let strict = s
        .dating
        .get_potential_matches(
            seeker.user_id,
            DatingFilter {
                min_compatibility: 0.9,
                ..filter.clone()
            },
        )
        .await
        .unwrap();
    assert!(strict.iter().all(|p| p.compatibility_score >= 0.9));
    assert!(!ids(&strict).contains(&near.user_id));
}

#[tokio::test]
#[ignore]
async fn concurrent_opposite_swipes_still_match() {
    let state = state().await;
    let s = services(&state);
    let rae = user(&state, "rae").await;
    let sam = user(&state, "sam").await;
    dating_profile(&state, &rae, Gender::Female, Gender::Male).await;
    dating_profile(&state, &sam, Gender::Male, Gender::Female).await;

    let (a, b) = tokio::join!(
        s.dating
            .record_dating_action(rae.user_id, sam.user_id, InteractionType::SwipeRight),
        s.dating
            .record_dating_action(sam.user_id, rae.user_id, InteractionType::SwipeRight),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(a.is_some() || b.is_some());

    let mutual = s
        .dating
        .get_mutual_matches(rae.user_id, Pagination::default())
        .await
        .unwrap();
    assert_eq!(mutual.len(), 1);
    assert_eq!(mutual[0].partner_id, sam.user_id);
}
