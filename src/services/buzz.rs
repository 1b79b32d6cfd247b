//! Synthetic buzz generation
//!
//! Asks the chat-completion backend for movie reviews (free text, split on a
//! delimiter) or actor tweets (schema-constrained JSON), scores every text
//! with the VADER sentiment lexicon, and reports the arithmetic mean of the
//! compound scores.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use vader_sentiment::SentimentIntensityAnalyzer;

use crate::services::chat_client::{ChatClient, ChatClientError};

/// Reviews are always presented as exactly this many entries
pub const REVIEW_COUNT: usize = 3;

/// Tweets requested per actor
pub const TWEET_COUNT: usize = 5;

const REVIEWER_PERSONAS: [&str; 7] = [
    "is harsh",
    "loves romance",
    "loves comedy",
    "loves thrillers",
    "loves fantasy",
    "appreciates cinematography",
    "enjoys storytelling",
];

/// A review with its sentiment compound score (in [-1.0, 1.0])
#[derive(Debug, Clone, Serialize)]
pub struct ScoredReview {
    pub text: String,
    pub compound: f64,
}

/// A tweet with its sentiment compound score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredTweet {
    pub username: String,
    pub text: String,
    pub compound: f64,
}

/// Movie reviews plus their average sentiment
#[derive(Debug, Clone, Serialize)]
pub struct MovieBuzz {
    pub reviews: Vec<ScoredReview>,
    pub average_sentiment: f64,
}

/// Actor tweets plus their average sentiment
#[derive(Debug, Clone, Serialize)]
pub struct ActorBuzz {
    pub tweets: Vec<ScoredTweet>,
    pub average_sentiment: f64,
}

#[derive(Debug, Deserialize)]
struct TweetSheet {
    tweets: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    username: String,
    text: String,
}

/// Generate three critic reviews for a movie and score them
pub async fn movie_reviews(
    chat: &ChatClient,
    title: &str,
    year: i64,
) -> Result<MovieBuzz, ChatClientError> {
    let system = format!(
        "You represent a group of {REVIEW_COUNT} film critics who have the following \
         personalities: {}. When you receive a question, respond as exactly {REVIEW_COUNT} \
         members of the group with each response separated by a '|' character, but don't \
         indicate which member you are. IMPORTANT: You must provide exactly {REVIEW_COUNT} \
         reviews separated by the '|' character.",
        REVIEWER_PERSONAS.join(","),
    );
    let user = format!(
        "How would you rate the movie {title} released in {year} out of 10 in 150 words \
         or less? Give me exactly {REVIEW_COUNT} reviews separated by '|'.",
    );

    let raw = chat.complete(&system, &user).await?;
    let texts = split_reviews(&raw, title);

    let analyzer = SentimentIntensityAnalyzer::new();
    let reviews: Vec<ScoredReview> = texts
        .into_iter()
        .map(|text| {
            let compound = compound_score(&analyzer, &text);
            ScoredReview { text, compound }
        })
        .collect();

    // Padding guarantees REVIEW_COUNT entries, so the mean is always defined
    let average_sentiment = mean(reviews.iter().map(|r| r.compound));

    Ok(MovieBuzz {
        reviews,
        average_sentiment,
    })
}

/// Generate five tweets about an actor and score them
///
/// A malformed backend response degrades to an empty list (average 0.0)
/// rather than failing the request.
pub async fn actor_tweets(chat: &ChatClient, name: &str) -> Result<ActorBuzz, ChatClientError> {
    let system = format!(
        "You represent {TWEET_COUNT} distinct social media users who tweet about film \
         actors. Respond only with JSON matching the requested schema: exactly \
         {TWEET_COUNT} tweets, each with a distinct username.",
    );
    let user = format!(
        "Write {TWEET_COUNT} short tweets reacting to the actor {name} and their recent work.",
    );

    let raw = chat
        .complete_json(&system, &user, "tweet_sheet", tweet_schema())
        .await?;
    let tweets = parse_tweets(&raw);

    let analyzer = SentimentIntensityAnalyzer::new();
    let tweets: Vec<ScoredTweet> = tweets
        .into_iter()
        .map(|tweet| {
            let compound = compound_score(&analyzer, &tweet.text);
            ScoredTweet {
                username: tweet.username,
                text: tweet.text,
                compound,
            }
        })
        .collect();

    let average_sentiment = mean(tweets.iter().map(|t| t.compound));

    Ok(ActorBuzz {
        tweets,
        average_sentiment,
    })
}

/// Split the delimited completion into exactly [`REVIEW_COUNT`] reviews
///
/// Short responses are padded with a generic filler review; long responses
/// are truncated.
fn split_reviews(raw: &str, title: &str) -> Vec<String> {
    let mut reviews: Vec<String> = raw
        .split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if reviews.len() > REVIEW_COUNT {
        tracing::warn!(
            received = reviews.len(),
            "Backend returned too many reviews, truncating"
        );
        reviews.truncate(REVIEW_COUNT);
    }

    while reviews.len() < REVIEW_COUNT {
        reviews.push(format!(
            "Review of {title}: A compelling film worth watching."
        ));
    }

    reviews
}

/// Parse the tweet-sheet JSON, degrading to an empty list on malformed input
fn parse_tweets(raw: &str) -> Vec<Tweet> {
    match serde_json::from_str::<TweetSheet>(raw) {
        Ok(sheet) => {
            let mut tweets = sheet.tweets;
            tweets.truncate(TWEET_COUNT);
            tweets
        }
        Err(e) => {
            tracing::warn!("Malformed tweet response, degrading to empty list: {}", e);
            Vec::new()
        }
    }
}

fn tweet_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "tweets": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "username": { "type": "string" },
                        "text": { "type": "string" }
                    },
                    "required": ["username", "text"]
                }
            }
        },
        "required": ["tweets"]
    })
}

fn compound_score(analyzer: &SentimentIntensityAnalyzer, text: &str) -> f64 {
    analyzer
        .polarity_scores(text)
        .get("compound")
        .copied()
        .unwrap_or(0.0)
}

/// Arithmetic mean, defined as 0.0 for an empty sequence
fn mean(scores: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = scores.fold((0.0, 0usize), |(sum, count), s| (sum + s, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
