//! Weighted linear combinations for each ranked surface.
//!
//! Every weight set defaults to the production weights and must sum to 1.0
//! (see `is_valid`). Signals are combined as plain dot products.

fn sums_to_one(weights: &[f64]) -> bool {
    let total: f64 = weights.iter().sum();
    weights.iter().all(|w| *w >= 0.0) && (total - 1.0).abs() < 0.001
}

/// Personalized feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedWeights {
    pub embedding: f64,
    pub node_similarity: f64,
    pub creator_similarity: f64,
    pub recency: f64,
    pub engagement: f64,
}

impl Default for FeedWeights {
    fn default() -> Self {
        Self {
            embedding: 0.3,
            node_similarity: 0.2,
            creator_similarity: 0.2,
            recency: 0.15,
            engagement: 0.15,
        }
    }
}

/// Raw feed signals for one post
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedSignals {
    pub embedding: f64,
    pub node_similarity: f64,
    pub creator_similarity: f64,
    pub recency: f64,
    pub engagement: f64,
}

impl FeedWeights {
    pub fn is_valid(&self) -> bool {
        sums_to_one(&[
            self.embedding,
            self.node_similarity,
            self.creator_similarity,
            self.recency,
            self.engagement,
        ])
    }

    pub fn score(&self, s: &FeedSignals) -> f64 {
        self.embedding * s.embedding
            + self.node_similarity * s.node_similarity
            + self.creator_similarity * s.creator_similarity
            + self.recency * s.recency
            + self.engagement * s.engagement
    }
}

/// Post search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostSearchWeights {
    pub text: f64,
    pub embedding: f64,
    pub node_similarity: f64,
    pub recency: f64,
    pub engagement: f64,
}

impl Default for PostSearchWeights {
    fn default() -> Self {
        Self {
            text: 0.35,
            embedding: 0.25,
            node_similarity: 0.2,
            recency: 0.1,
            engagement: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PostSearchSignals {
    pub text: f64,
    pub embedding: f64,
    pub node_similarity: f64,
    pub recency: f64,
    pub engagement: f64,
}

impl PostSearchWeights {
    pub fn is_valid(&self) -> bool {
        sums_to_one(&[
            self.text,
            self.embedding,
            self.node_similarity,
            self.recency,
            self.engagement,
        ])
    }

    pub fn score(&self, s: &PostSearchSignals) -> f64 {
        self.text * s.text
            + self.embedding * s.embedding
            + self.node_similarity * s.node_similarity
            + self.recency * s.recency
            + self.engagement * s.engagement
    }
}

/// Profile search relevance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileSearchWeights {
    pub text: f64,
    pub embedding: f64,
    pub completeness: f64,
    pub engagement: f64,
}

impl Default for ProfileSearchWeights {
    fn default() -> Self {
        Self {
            text: 0.4,
            embedding: 0.3,
            completeness: 0.2,
            engagement: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfileSearchSignals {
    pub text: f64,
    pub embedding: f64,
    pub completeness: f64,
    pub engagement: f64,
}

impl ProfileSearchWeights {
    pub fn is_valid(&self) -> bool {
        sums_to_one(&[self.text, self.embedding, self.completeness, self.engagement])
    }

    pub fn score(&self, s: &ProfileSearchSignals) -> f64 {
        self.text * s.text
            + self.embedding * s.embedding
            + self.completeness * s.completeness
            + self.engagement * s.engagement
    }
}

/// Location score used when either side has no coordinates
pub const UNKNOWN_LOCATION_SCORE: f64 = 0.5;

/// Dating compatibility
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatingWeights {
    pub embedding: f64,
    pub node_similarity: f64,
    pub interaction: f64,
    pub location: f64,
}

impl Default for DatingWeights {
    fn default() -> Self {
        Self {
            embedding: 0.3,
            node_similarity: 0.2,
            interaction: 0.2,
            location: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DatingSignals {
    pub embedding: f64,
    pub node_similarity: f64,
    pub interaction: f64,
    pub location: f64,
}

impl DatingWeights {
    pub fn is_valid(&self) -> bool {
        sums_to_one(&[
            self.embedding,
            self.node_similarity,
            self.interaction,
            self.location,
        ])
    }

    pub fn score(&self, s: &DatingSignals) -> f64 {
        self.embedding * s.embedding
            + self.node_similarity * s.node_similarity
            + self.interaction * s.interaction
            + self.location * s.location
    }
}

/// Pairwise user similarity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityWeights {
    pub content: f64,
    pub interaction: f64,
    pub social: f64,
    pub location: f64,
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            content: 0.3,
            interaction: 0.3,
            social: 0.2,
            location: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimilaritySignals {
    pub content: f64,
    pub interaction: f64,
    pub social: f64,
    pub location: f64,
}

impl SimilarityWeights {
    pub fn is_valid(&self) -> bool {
        sums_to_one(&[self.content, self.interaction, self.social, self.location])
    }

    pub fn score(&self, s: &SimilaritySignals) -> f64 {
        self.content * s.content
            + self.interaction * s.interaction
            + self.social * s.social
            + self.location * s.location
    }
}

/// "People you may know"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserSuggestionWeights {
    pub embedding: f64,
    pub mutual_follows: f64,
    pub interactions: f64,
    pub location: f64,
}

impl Default for UserSuggestionWeights {
    fn default() -> Self {
        Self {
            embedding: 0.4,
            mutual_follows: 0.2,
            interactions: 0.2,
            location: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UserSuggestionSignals {
    pub embedding: f64,
    pub mutual_follows: f64,
    pub interactions: f64,
    pub location: f64,
}

impl UserSuggestionWeights {
    pub fn is_valid(&self) -> bool {
        sums_to_one(&[
            self.embedding,
            self.mutual_follows,
            self.interactions,
            self.location,
        ])
    }

    pub fn score(&self, s: &UserSuggestionSignals) -> f64 {
        self.embedding * s.embedding
            + self.mutual_follows * s.mutual_follows
            + self.interactions * s.interactions
            + self.location * s.location
    }
}

/// Creator suggestions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreatorSuggestionWeights {
    pub embedding: f64,
    pub engagement: f64,
    pub audience_overlap: f64,
}

impl Default for CreatorSuggestionWeights {
    fn default() -> Self {
        Self {
            embedding: 0.4,
            engagement: 0.3,
            audience_overlap: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CreatorSuggestionSignals {
    pub embedding: f64,
    pub engagement: f64,
    pub audience_overlap: f64,
}

impl CreatorSuggestionWeights {
    pub fn is_valid(&self) -> bool {
        sums_to_one(&[self.embedding, self.engagement, self.audience_overlap])
    }

    pub fn score(&self, s: &CreatorSuggestionSignals) -> f64 {
        self.embedding * s.embedding
            + self.engagement * s.engagement
            + self.audience_overlap * s.audience_overlap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weight_sets_are_valid() {
        assert!(FeedWeights::default().is_valid());
        assert!(PostSearchWeights::default().is_valid());
        assert!(ProfileSearchWeights::default().is_valid());
        assert!(DatingWeights::default().is_valid());
        assert!(SimilarityWeights::default().is_valid());
        assert!(UserSuggestionWeights::default().is_valid());
        assert!(CreatorSuggestionWeights::default().is_valid());
    }

    #[test]
    fn test_invalid_weight_sets_detected() {
        let over = FeedWeights {
            engagement: 0.5,
            ..Default::default()
        };
        assert!(!over.is_valid());

        let negative = CreatorSuggestionWeights {
            embedding: 1.1,
            engagement: -0.1,
            audience_overlap: 0.0,
        };
        assert!(!negative.is_valid());
    }

    #[test]
    fn test_feed_score_all_ones_is_one() {
        let s = FeedSignals {
            embedding: 1.0,
            node_similarity: 1.0,
            creator_similarity: 1.0,
            recency: 1.0,
            engagement: 1.0,
        };
        assert!((FeedWeights::default().score(&s) - 1.0).abs() < 1e-9);
        assert_eq!(FeedWeights::default().score(&FeedSignals::default()), 0.0);
    }

    #[test]
    fn test_dating_unknown_location_contributes_fixed_share() {
        let s = DatingSignals {
            location: UNKNOWN_LOCATION_SCORE,
            ..Default::default()
        };
        assert!((DatingWeights::default().score(&s) - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_post_search_text_dominates() {
        let w = PostSearchWeights::default();
        let title_hit = PostSearchSignals {
            text: 1.0,
            ..Default::default()
        };
        let embed_hit = PostSearchSignals {
            embedding: 1.0,
            ..Default::default()
        };
        assert!(w.score(&title_hit) > w.score(&embed_hit));
    }

    #[test]
    fn test_profile_and_similarity_scores() {
        let p = ProfileSearchSignals {
            text: 1.0,
            embedding: 0.5,
            completeness: 0.6,
            engagement: 0.2,
        };
        // 0.4 + 0.15 + 0.12 + 0.02
        assert!((ProfileSearchWeights::default().score(&p) - 0.69).abs() < 1e-9);

        let sim = SimilaritySignals {
            content: 1.0,
            interaction: 0.0,
            social: 0.5,
            location: 0.5,
        };
        // 0.3 + 0.1 + 0.1
        assert!((SimilarityWeights::default().score(&sim) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_suggestion_scores() {
        let u = UserSuggestionSignals {
            embedding: 0.5,
            mutual_follows: 1.0,
            interactions: 0.0,
            location: 0.0,
        };
        assert!((UserSuggestionWeights::default().score(&u) - 0.4).abs() < 1e-9);

        let c = CreatorSuggestionSignals {
            embedding: 0.0,
            engagement: 1.0,
            audience_overlap: 1.0,
        };
        assert!((CreatorSuggestionWeights::default().score(&c) - 0.6).abs() < 1e-9);
    }
}
