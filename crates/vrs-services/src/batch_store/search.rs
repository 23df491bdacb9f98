use vrs_core::UploadBatch;

/// Case-insensitive substring match on chassis id, newest first.
///
/// A blank query returns every batch. Otherwise the query is matched as typed,
/// surrounding whitespace included.
pub fn search<'a>(batches: &'a [UploadBatch], query: &str) -> Vec<&'a UploadBatch> {
    let blank = query.trim().is_empty();
    let needle = query.to_lowercase();
    let mut results: Vec<&UploadBatch> = batches
        .iter()
        .filter(|b| blank || b.chassis_id.to_lowercase().contains(&needle))
        .collect();
    results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    results
}

/// The most recent batch recorded for `chassis_id`, if any.
pub fn find_by_chassis_id<'a>(batches: &'a [UploadBatch], chassis_id: &str) -> Option<&'a UploadBatch> {
    batches
        .iter()
        .filter(|b| b.chassis_id == chassis_id)
        .max_by_key(|b| b.timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn batches() -> Vec<UploadBatch> {
        let now = Utc::now();
        vec![
            UploadBatch::new("1234", "AR3", Vec::new(), now - Duration::hours(3)),
            UploadBatch::new("9912", "AR3", Vec::new(), now - Duration::hours(1)),
            UploadBatch::new("5555", "AR3", Vec::new(), now - Duration::hours(2)),
        ]
    }

    fn ids(results: &[&UploadBatch]) -> Vec<String> {
        results.iter().map(|b| b.chassis_id.clone()).collect()
    }

    #[test]
    fn blank_query_returns_all_newest_first() {
        let batches = batches();
        assert_eq!(ids(&search(&batches, "")), vec!["9912", "5555", "1234"]);
        assert_eq!(ids(&search(&batches, "   ")), vec!["9912", "5555", "1234"]);
    }

    #[test]
    fn query_matches_substrings() {
        let batches = batches();
        assert_eq!(ids(&search(&batches, "12")), vec!["9912", "1234"]);
        assert_eq!(ids(&search(&batches, "55")), vec!["5555"]);
        assert!(search(&batches, "99x").is_empty());
    }

    #[test]
    fn padded_query_is_not_trimmed_before_matching() {
        let batches = batches();
        assert!(search(&batches, " 55 ").is_empty());
        assert!(search(&batches, "55 ").is_empty());
    }

    #[test]
    fn find_returns_latest_match() {
        let now = Utc::now();
        let mut batches = batches();
        batches.push(UploadBatch::new("1234", "AR3", Vec::new(), now));

        let found = find_by_chassis_id(&batches, "1234").unwrap();
        assert_eq!(found.timestamp, now);
        assert!(find_by_chassis_id(&batches, "0000").is_none());
        assert!(find_by_chassis_id(&batches, "123").is_none());
    }
}
