//! Plain-text rendering of places, results and alerts

use std::fmt::Write;
use thirdplaces_core::{PlaceCandidate, PlaceId, PlaceRecord, RankedResult, SavedPlaces, UserAlert};

const DESCRIPTION_WIDTH: usize = 72;

fn category_label(place: &PlaceRecord) -> String {
    match place.category() {
        Some(category) => category.to_string(),
        None if place.category.is_empty() => "Uncategorized".to_string(),
        None => place.category.clone(),
    }
}

fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn push_description(out: &mut String, place: &PlaceRecord, show: bool) {
    if show && !place.description.trim().is_empty() {
        let _ = writeln!(out, "     {}", shorten(place.description.trim(), DESCRIPTION_WIDTH));
    }
}

/// Ranked search results, best first
pub fn render_results(query: &str, results: &[RankedResult], show_descriptions: bool) -> String {
    if results.is_empty() {
        return format!("No places match \"{}\"\n", query.trim());
    }

    let mut out = format!("Top {} for \"{}\"\n", results.len(), query.trim());
    for (i, result) in results.iter().enumerate() {
        let place = &result.place;
        let _ = writeln!(
            out,
            "{:>2}. {} [{}] {:.3}",
            i + 1,
            place.name,
            category_label(place),
            result.similarity
        );
        if !place.address.is_empty() {
            let _ = writeln!(out, "     {}", place.address);
        }
        push_description(&mut out, place, show_descriptions);
    }
    out
}

/// Feed entries with like state
pub fn render_places<F>(places: &[&PlaceRecord], is_liked: F, show_descriptions: bool) -> String
where
    F: Fn(PlaceId) -> bool,
{
    if places.is_empty() {
        return "No places yet\n".to_string();
    }

    let mut out = String::new();
    for place in places {
        let heart = if is_liked(place.id) { "*" } else { " " };
        let _ = writeln!(
            out,
            "#{:<5} {} [{}] {}{} likes  added {}",
            place.id,
            place.name,
            category_label(place),
            heart,
            place.likes,
            place.created_at.format("%Y-%m-%d"),
        );
        if !place.address.is_empty() {
            let _ = writeln!(out, "       {}", place.address);
        }
        push_description(&mut out, place, show_descriptions);
    }
    out
}

/// Saved places with their notes
pub fn render_saved(saved: &SavedPlaces) -> String {
    if saved.is_empty() {
        return "No saved places\n".to_string();
    }

    let mut out = format!("{} saved\n", saved.len());
    for place in saved.iter() {
        let _ = writeln!(out, "#{:<5} {} [{}]", place.id, place.name, category_label(place));
        if let Some(note) = place.note.as_deref().filter(|n| !n.trim().is_empty()) {
            let _ = writeln!(out, "       note: {}", note.trim());
        }
    }
    out
}

/// Lookup hits, numbered from 1 for `--pick`
pub fn render_candidates(candidates: &[PlaceCandidate]) -> String {
    if candidates.is_empty() {
        return "No places found\n".to_string();
    }

    let mut out = String::new();
    for (i, candidate) in candidates.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}\n    {} ({:.5}, {:.5})",
            i + 1,
            candidate.name,
            candidate.address,
            candidate.latitude,
            candidate.longitude
        );
    }
    out
}

/// One-line alert
pub fn render_alert(alert: &UserAlert) -> String {
    format!("! {}: {}\n", alert.title, alert.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thirdplaces_core::testing::sample_place;
    use thirdplaces_core::{Category, SavedPlacesAction};

    #[test]
    fn test_results_are_numbered_in_order() {
        let results = vec![
            RankedResult {
                place: sample_place(1, "Philz Coffee", Category::Food),
                similarity: 0.91,
            },
            RankedResult {
                place: sample_place(2, "Green Library", Category::Workspace),
                similarity: 0.4,
            },
        ];
        let text = render_results(" coffee ", &results, false);
        assert!(text.starts_with("Top 2 for \"coffee\"\n"));
        let philz = text.find(" 1. Philz Coffee [Food] 0.910").unwrap();
        let library = text.find(" 2. Green Library [Workspace] 0.400").unwrap();
        assert!(philz < library);
    }

    #[test]
    fn test_empty_results() {
        assert_eq!(render_results("tea", &[], true), "No places match \"tea\"\n");
    }

    #[test]
    fn test_places_mark_liked() {
        let a = sample_place(1, "Dish Trail", Category::Outdoors);
        let b = sample_place(2, "Coho", Category::Nightlife);
        let text = render_places(&[&a, &b], |id| id == 2, false);
        let lines: Vec<&str> = text.lines().filter(|l| l.starts_with('#')).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(" 0 likes"));
        assert!(lines[1].contains("*0 likes"));
    }

    #[test]
    fn test_unknown_category_shown_verbatim() {
        let mut place = sample_place(3, "Secret Spot", Category::Discover);
        place.category = "rooftops".to_string();
        let text = render_places(&[&place], |_| false, false);
        assert!(text.contains("[rooftops]"));
    }

    #[test]
    fn test_saved_shows_notes() {
        let saved = SavedPlaces::new()
            .reduce(SavedPlacesAction::Save(sample_place(5, "Coupa", Category::Food)))
            .reduce(SavedPlacesAction::UpdateNote {
                id: 5,
                note: Some("get the mocha".to_string()),
            });
        let text = render_saved(&saved);
        assert!(text.contains("note: get the mocha"));
        assert_eq!(render_saved(&SavedPlaces::new()), "No saved places\n");
    }

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("short", 10), "short");
        assert_eq!(shorten("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_alert() {
        let alert = UserAlert::new("Error", "Failed to update likes: timeout");
        assert_eq!(render_alert(&alert), "! Error: Failed to update likes: timeout\n");
    }
}
