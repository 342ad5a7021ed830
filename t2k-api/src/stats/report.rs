//! Report assembly and UI cards

use super::artists::ArtistAggregate;
use super::movement::Classification;
use super::reentry::ReentrySplit;
use crate::models::{
    AdjacentSequence, BasicSongRecord, Card, CardPayload, OneHitRecord, StatisticsReport,
};

/// Outputs of every stage, ready to be merged
#[derive(Debug, Clone)]
pub struct StageOutputs {
    pub year: i32,
    pub top: i32,
    pub top_artists: i32,
    pub classification: Classification,
    pub reentries: ReentrySplit,
    pub adjacent_sequences: Vec<AdjacentSequence>,
    pub adjacent_runs: Vec<BasicSongRecord>,
    pub artists: ArtistAggregate,
    pub classics: Vec<BasicSongRecord>,
    pub one_hits: Vec<OneHitRecord>,
}

pub fn assemble(outputs: StageOutputs) -> StatisticsReport {
    let StageOutputs {
        year,
        top,
        top_artists,
        classification,
        reentries,
        adjacent_sequences,
        adjacent_runs,
        artists,
        classics,
        one_hits,
    } = outputs;

    let single_appearances = one_hits.iter().map(OneHitRecord::to_basic).collect();

    let mut report = StatisticsReport {
        year,
        biggest_rises: classification.rises,
        biggest_falls: classification.falls,
        new_entries: reentries.pure_new,
        dropped_entries: classification.dropped,
        reentries: reentries.reentries,
        unchanged: classification.unchanged,
        adjacent_artist_runs: adjacent_runs,
        all_time_classics: classics,
        one_hit_wonders: one_hits,
        top_artists: artists.top_artists,
        artist_counts: artists.artist_counts,
        movements: classification.movements,
        same_position: classification.same_position,
        adjacent_sequences,
        single_appearances,
        artist_stats: artists.artist_stats,
        cards: Vec::new(),
    };

    report.cards = build_cards(&report, top, top_artists);
    report
}

/// Titled views over the finished report, in display order
pub fn build_cards(report: &StatisticsReport, top: i32, top_artists: i32) -> Vec<Card> {
    let year = report.year;

    vec![
        card(
            "Grootste dalers",
            format!("Top {}", top),
            CardPayload::Movements(report.biggest_falls.clone()),
        ),
        card(
            "Grootste stijgers",
            format!("Top {}", top),
            CardPayload::Movements(report.biggest_rises.clone()),
        ),
        card(
            "Alle liedjes in alle edities",
            "Gesorteerd op titel".to_string(),
            CardPayload::Songs(report.all_time_classics.clone()),
        ),
        card(
            "Nieuwe binnenkomers",
            format!("Top {}", top),
            CardPayload::Songs(report.new_entries.clone()),
        ),
        card(
            "Uitgevallen",
            format!("Verloren uit top {}", top),
            CardPayload::Songs(report.dropped_entries.clone()),
        ),
        card(
            "Opnieuw binnengekomen",
            "Nieuwe binnenkomers maar eerder aanwezig".to_string(),
            CardPayload::Songs(report.reentries.clone()),
        ),
        card(
            "Onveranderde posities",
            format!("Blijven op dezelfde plek in {}", year),
            CardPayload::Songs(report.unchanged.clone()),
        ),
        card(
            "Aansluitende posities door dezelfde artiest",
            "2+ opvolgende posities".to_string(),
            CardPayload::Songs(report.adjacent_artist_runs.clone()),
        ),
        card(
            "One-hit wonders",
            "Slechts 1 keer in de TOP2000".to_string(),
            CardPayload::OneHits(report.one_hit_wonders.clone()),
        ),
        card(
            &format!("Top artiesten (top {} met gelijke aantallen)", top_artists),
            format!("Jaar {}", year),
            CardPayload::ArtistStats(report.top_artists.clone()),
        ),
        card(
            "Artiesten Top (count)",
            format!("Top {} artists in positions", top),
            CardPayload::ArtistCounts(report.artist_counts.clone()),
        ),
    ]
}

fn card(title: &str, subtitle: String, payload: CardPayload) -> Card {
    Card {
        title: title.to_string(),
        subtitle: Some(subtitle),
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChartEntry;
    use crate::stats::reconcile::WorkingSet;
    use crate::stats::{adjacent, artists, movement};

    fn entry(song_id: i64, year: i32, position: i32, artist_id: i64) -> ChartEntry {
        ChartEntry {
            song_id,
            position,
            year,
            release_year: Some(1990),
            title: format!("Song {}", song_id),
            artist_id,
            artist_name: format!("Artist {}", artist_id),
        }
    }

    fn outputs() -> StageOutputs {
        let this_top = vec![entry(1, 2021, 1, 1), entry(2, 2021, 2, 1), entry(3, 2021, 3, 2)];
        let prev_all = vec![entry(1, 2020, 2, 1), entry(4, 2020, 1, 3)];
        let working = WorkingSet::from_charts(2021, 10, this_top.clone(), prev_all);
        let classification = movement::classify(&working);
        let adjacent_sequences = adjacent::detect_runs(&this_top);

        StageOutputs {
            year: 2021,
            top: 10,
            top_artists: 3,
            reentries: ReentrySplit {
                reentries: Vec::new(),
                pure_new: classification.new_entries.clone(),
            },
            classification,
            adjacent_runs: adjacent::flatten_runs(&adjacent_sequences),
            adjacent_sequences,
            artists: artists::aggregate(&this_top, 3),
            classics: Vec::new(),
            one_hits: vec![OneHitRecord {
                song_id: 9,
                title: "Once".to_string(),
                artist_name: "Artist 9".to_string(),
                release_year: None,
                position: 1500,
                year: 2005,
            }],
        }
    }

    #[test]
    fn test_cards_follow_report_fields() {
        let report = assemble(outputs());

        assert_eq!(report.cards.len(), 11);
        assert_eq!(report.cards[0].title, "Grootste dalers");
        assert_eq!(report.cards[1].title, "Grootste stijgers");
        assert_eq!(
            report.cards[1].payload,
            CardPayload::Movements(report.biggest_rises.clone())
        );
        assert_eq!(
            report.cards[3].payload,
            CardPayload::Songs(report.new_entries.clone())
        );
        assert_eq!(report.cards[6].subtitle.as_deref(), Some("Blijven op dezelfde plek in 2021"));
        assert_eq!(
            report.cards[9].title,
            "Top artiesten (top 3 met gelijke aantallen)"
        );
    }

    #[test]
    fn test_single_appearances_mirror_one_hits() {
        let report = assemble(outputs());

        assert_eq!(report.single_appearances.len(), 1);
        assert_eq!(report.single_appearances[0].song_id, 9);
        assert_eq!(report.single_appearances[0].position, Some(1500));
    }

    #[test]
    fn test_report_serializes_frontend_names() {
        let report = assemble(outputs());
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("biggestRises").is_some());
        assert!(json.get("adjacentArtistRuns").is_some());
        assert_eq!(json["biggestRises"][0]["titel"], "Song 1");
        assert_eq!(json["biggestRises"][0]["positionLastYear"], 2);
        assert!(json["cards"][0]["payload"].is_array());
    }
}
