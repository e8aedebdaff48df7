/// 評論數上限，超過不再加分
const REVIEW_CAP: u64 = 500;

/// `round(rating * 15 + min(reviews, 500) / 20)`; no rating, no score.
pub fn trust_score(rating: Option<f64>, review_count: Option<u64>) -> Option<u32> {
    let rating = rating?;
    let reviews = review_count.unwrap_or(0).min(REVIEW_CAP) as f64;
    Some((rating * 15.0 + reviews / 20.0).round() as u32)
}
