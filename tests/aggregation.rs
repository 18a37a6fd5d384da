//! End-to-end aggregation tests driven through CSV files on disk, the way
//! the dashboard actually consumes data.

use std::io::Write;

use mingle::dataset::{parse_timestamp, Dataset};
use mingle::engine::{build_full_graph, build_graph, cumulative_series, revealed_graph, top_n};
use mingle::error::MingleError;
use mingle::layout::spring_layout;

const HEADER: &str = "class,filename,timestamp,xmin,ymin,xmax,ymax\n";

fn write_csv(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A small workshop: a group photo, a selfie, and two later pair photos.
fn workshop_csv() -> tempfile::NamedTempFile {
    write_csv(&format!(
        "{HEADER}\
         alice,relay.jpg,2024-08-14 10:00:00,0,0,10,10\n\
         bob,relay.jpg,2024-08-14 10:00:00,10,0,20,10\n\
         carol,relay.jpg,2024-08-14 10:00:00,20,0,30,10\n\
         dave,selfie.jpg,2024-08-14 10:30:00,0,0,10,10\n\
         alice,lunch.jpg,2024-08-14 12:00:00,0,0,10,10\n\
         bob,lunch.jpg,2024-08-14 12:00:00,10,0,20,10\n\
         alice,closing.jpg,2024-08-14 17:00:00,0,0,10,10\n\
         carol,closing.jpg,2024-08-14 17:00:00,10,0,20,10\n"
    ))
}

#[test]
fn graph_weights_are_monotonic_across_cutoffs() {
    let file = workshop_csv();
    let dataset = Dataset::load(file.path()).unwrap();

    let cutoffs = [
        parse_timestamp("2024-08-14 10:00:00").unwrap(),
        parse_timestamp("2024-08-14 12:00:00").unwrap(),
        parse_timestamp("2024-08-14 17:00:00").unwrap(),
    ];

    let graphs: Vec<_> = cutoffs
        .iter()
        .map(|cutoff| build_graph(dataset.records(), *cutoff))
        .collect();

    for window in graphs.windows(2) {
        let (earlier, later) = (&window[0], &window[1]);
        for (pair, weight) in earlier.edges() {
            assert!(
                later.weight(pair.first(), pair.second()) >= weight,
                "weight for {:?} shrank between cutoffs",
                pair
            );
        }
    }

    // The group photo of three people produced C(3,2) = 3 edges.
    assert_eq!(graphs[0].edge_count(), 3);
    // alice-bob picks up a second shared photo at lunch.
    assert_eq!(graphs[1].weight("alice", "bob"), 2);
    assert_eq!(graphs[2].weight("alice", "carol"), 2);
}

#[test]
fn selfie_contributes_node_but_no_edges() {
    let file = workshop_csv();
    let dataset = Dataset::load(file.path()).unwrap();
    let graph = build_full_graph(dataset.records());

    assert!(graph.contains_node("dave"));
    for (pair, _) in graph.edges() {
        assert_ne!(pair.first(), "dave");
        assert_ne!(pair.second(), "dave");
    }
}

#[test]
fn cutoff_before_first_photo_degrades_to_empty_graph() {
    let file = workshop_csv();
    let dataset = Dataset::load(file.path()).unwrap();
    let cutoff = parse_timestamp("2024-08-14 08:00:00").unwrap();

    let graph = build_graph(dataset.records(), cutoff);
    assert!(graph.is_empty());
}

#[test]
fn cumulative_counts_never_decrease() {
    let file = workshop_csv();
    let dataset = Dataset::load(file.path()).unwrap();

    for person in dataset.people() {
        let series = cumulative_series(dataset.records(), &person);
        for (other, row) in &series.counts {
            for pair in row.windows(2) {
                assert!(
                    pair[0] <= pair[1],
                    "series for focal {} / other {} decreased",
                    person,
                    other
                );
            }
        }
    }
}

#[test]
fn two_photo_example_from_csv() {
    let file = write_csv(&format!(
        "{HEADER}\
         alice,photo1,2024-08-14 10:01:00,0,0,1,1\n\
         bob,photo1,2024-08-14 10:01:00,0,0,1,1\n\
         alice,photo2,2024-08-14 10:02:00,0,0,1,1\n\
         carol,photo2,2024-08-14 10:02:00,0,0,1,1\n"
    ));
    let dataset = Dataset::load(file.path()).unwrap();

    let t1 = parse_timestamp("2024-08-14 10:01:00").unwrap();
    let t2 = parse_timestamp("2024-08-14 10:02:00").unwrap();

    let at_t1 = build_graph(dataset.records(), t1);
    assert_eq!(at_t1.edge_count(), 1);
    assert_eq!(at_t1.weight("alice", "bob"), 1);

    let at_t2 = build_graph(dataset.records(), t2);
    assert_eq!(at_t2.edge_count(), 2);
    assert_eq!(at_t2.weight("alice", "bob"), 1);
    assert_eq!(at_t2.weight("alice", "carol"), 1);

    let series = cumulative_series(dataset.records(), "alice");
    assert_eq!(series.counts["bob"], vec![1, 1]);
    assert_eq!(series.counts["carol"], vec![0, 1]);
}

#[test]
fn top_ranking_is_deterministic_under_ties() {
    let file = workshop_csv();
    let dataset = Dataset::load(file.path()).unwrap();

    let series = cumulative_series(dataset.records(), "alice");
    let last = series.len() - 1;

    // bob and carol both end at 2 shared photos with alice.
    let ranked = top_n(&series, last, 3);
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].person, "bob");
    assert_eq!(ranked[0].count, 2);
    assert_eq!(ranked[1].person, "carol");
    assert_eq!(ranked[1].count, 2);
}

#[test]
fn layout_is_reproducible_for_a_dataset() {
    let file = workshop_csv();
    let dataset = Dataset::load(file.path()).unwrap();
    let graph = build_full_graph(dataset.records());

    let a = spring_layout(&graph, 42, 150);
    let b = spring_layout(&graph, 42, 150);
    assert_eq!(a.positions(), b.positions());
    assert_eq!(a.len(), graph.node_count());
}

#[test]
fn error_taxonomy_is_distinct() {
    // Missing file.
    let missing = Dataset::load("/no/such/finaldata.csv").unwrap_err();
    assert!(matches!(missing, MingleError::MissingInputFile(_)));

    // Empty dataset.
    let empty_file = write_csv(HEADER);
    let empty = Dataset::load(empty_file.path()).unwrap_err();
    assert!(matches!(empty, MingleError::EmptyDataset(_)));

    // Unknown focal person degrades to an empty series, not an error.
    let file = workshop_csv();
    let dataset = Dataset::load(file.path()).unwrap();
    let series = cumulative_series(dataset.records(), "nobody");
    assert!(series.is_empty());
}

#[test]
fn manito_reveal_from_csv() {
    let file = write_csv(
        "from,to,description\n\
         alice,bob,wrote a letter\n\
         bob,carol,left a snack\n\
         carol,alice,cheered at the relay\n",
    );
    let records = Dataset::load_manito(file.path()).unwrap();

    assert!(revealed_graph(&records, 0).edges().is_empty());

    let halfway = revealed_graph(&records, 2);
    assert_eq!(halfway.edge_count(), 2);
    assert_eq!(halfway.edges()[0].from, "alice");

    let full = revealed_graph(&records, records.len());
    assert_eq!(full.edge_count(), 3);
    assert_eq!(full.node_count(), 3);
    assert_eq!(full.node_description("carol"), Some("cheered at the relay"));
}
