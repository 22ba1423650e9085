/// Output formatting: terminal table and JSON.
use serde::Serialize;
use std::collections::HashMap;
use tasteduel_core::{ConfidenceBreakdown, Item, ItemId};

#[derive(Serialize)]
struct JsonRankedItem {
    rank: usize,
    id: ItemId,
    name: String,
    rating: f64,
    comparisons: usize,
}

#[derive(Serialize)]
struct JsonConfidence {
    score: f64,
    coverage: f64,
    rating_spread: f64,
    consistency: f64,
    predictive_accuracy: f64,
    category_coverage: f64,
}

#[derive(Serialize)]
struct JsonOutput {
    items: Vec<JsonRankedItem>,
    total_comparisons: usize,
    confidence: Option<JsonConfidence>,
}

/// Format ranked items as a terminal table.
pub fn format_table(
    rankings: &[Item],
    games_played: &HashMap<ItemId, usize>,
    total_comparisons: usize,
    confidence: Option<&ConfidenceBreakdown>,
) -> String {
    let mut out = String::new();

    // Find the widest item name for padding
    let name_width = rankings.iter().map(|r| r.name.len()).max().unwrap_or(4).max(4); // at least "Item"

    out.push_str(&format!(" # | {:<name_width$} | Rating | Comparisons\n", "Item"));
    out.push_str(&format!("---|-{}-|--------|------------\n", "-".repeat(name_width)));

    for (i, item) in rankings.iter().enumerate() {
        let games = games_played.get(&item.id).copied().unwrap_or(0);
        out.push_str(&format!(
            "{:>2} | {:<name_width$} | {:>6.0} | {:>11}\n",
            i + 1,
            item.name,
            item.rating,
            games,
        ));
    }

    out.push_str(&format!("\n{} items ranked from {} comparisons\n", rankings.len(), total_comparisons));
    match confidence {
        Some(c) => out.push_str(&format!(
            "Confidence: {:.0}% (coverage {:.0}%, consistency {:.0}%, spread {:.0}%, accuracy {:.0}%, categories {:.0}%)\n",
            c.score() * 100.0,
            c.coverage * 100.0,
            c.consistency * 100.0,
            c.rating_spread * 100.0,
            c.predictive_accuracy * 100.0,
            c.category_coverage.min(1.0) * 100.0,
        )),
        None => out.push_str("Confidence: 0% (no comparisons yet)\n"),
    }
    out
}

/// Print results as a formatted terminal table.
pub fn print_table(
    rankings: &[Item],
    games_played: &HashMap<ItemId, usize>,
    total_comparisons: usize,
    confidence: Option<&ConfidenceBreakdown>,
) {
    print!("{}", format_table(rankings, games_played, total_comparisons, confidence));
}

/// Format results as pretty JSON.
pub fn format_json(
    rankings: &[Item],
    games_played: &HashMap<ItemId, usize>,
    total_comparisons: usize,
    confidence: Option<&ConfidenceBreakdown>,
) -> String {
    let items: Vec<JsonRankedItem> = rankings
        .iter()
        .enumerate()
        .map(|(i, item)| JsonRankedItem {
            rank: i + 1,
            id: item.id,
            name: item.name.clone(),
            rating: item.rating,
            comparisons: games_played.get(&item.id).copied().unwrap_or(0),
        })
        .collect();

    let output = JsonOutput {
        items,
        total_comparisons,
        confidence: confidence.map(|c| JsonConfidence {
            score: c.score(),
            coverage: c.coverage,
            rating_spread: c.rating_spread,
            consistency: c.consistency,
            predictive_accuracy: c.predictive_accuracy,
            category_coverage: c.category_coverage,
        }),
    };

    serde_json::to_string_pretty(&output).unwrap_or_else(|e| crate::bail(format!("Failed to encode results: {e}")))
}

/// Print results as JSON.
pub fn print_json(
    rankings: &[Item],
    games_played: &HashMap<ItemId, usize>,
    total_comparisons: usize,
    confidence: Option<&ConfidenceBreakdown>,
) {
    println!("{}", format_json(rankings, games_played, total_comparisons, confidence));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked() -> (Vec<Item>, HashMap<ItemId, usize>) {
        let items = vec![
            Item::new(2, "Sushi").with_rating(1232.0),
            Item::new(1, "Ice Cream").with_rating(1184.0),
        ];
        let games = HashMap::from([(2, 3), (1, 1)]);
        (items, games)
    }

    #[test]
    fn test_table_layout() {
        let (items, games) = ranked();
        let table = format_table(&items, &games, 3, None);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], " # | Item      | Rating | Comparisons");
        assert_eq!(lines[2], " 1 | Sushi     |   1232 |           3");
        assert_eq!(lines[3], " 2 | Ice Cream |   1184 |           1");
        assert!(table.contains("2 items ranked from 3 comparisons"));
        assert!(table.contains("no comparisons yet"));
    }

    #[test]
    fn test_json_output() {
        let (items, games) = ranked();
        let breakdown = ConfidenceBreakdown {
            history_len: 3,
            coverage: 1.0,
            rating_spread: 0.06,
            consistency: 1.0,
            predictive_accuracy: 0.0,
            category_coverage: 0.0,
        };
        let json = format_json(&items, &games, 3, Some(&breakdown));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["items"][0]["name"], "Sushi");
        assert_eq!(value["items"][0]["rank"], 1);
        assert_eq!(value["items"][1]["comparisons"], 1);
        assert_eq!(value["total_comparisons"], 3);
        assert!(value["confidence"]["score"].as_f64().unwrap() > 0.0);
    }
}
