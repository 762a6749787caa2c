//! Properties of the codec, query engine and statistics over arbitrary snapshots

use proptest::prelude::*;

use voozaa_core::codec;
use voozaa_core::integrity;
use voozaa_core::query::{self, CustomerField, LeadField};
use voozaa_core::state::{default_customer_tags, default_lead_stages};
use voozaa_core::stats;
use voozaa_core::{
    CustomerInput, CustomerQuery, CustomerStatus, Filter, LeadInput, LeadQuery, LocationInput,
    SortDirection, SortField, SortSpec, TrackerState,
};

const LOCATIONS: [&str; 2] = ["Berlin", "Hamburg"];

#[derive(Debug, Clone)]
struct LeadSeed {
    name: String,
    company: String,
    stage: String,
    value: f64,
    location: Option<usize>,
}

#[derive(Debug, Clone)]
struct CustomerSeed {
    name: String,
    status: CustomerStatus,
    tags: Vec<String>,
    mrr: f64,
    location: Option<usize>,
}

fn lead_seed() -> impl Strategy<Value = LeadSeed> {
    (
        "[A-ZÄÖÜ][a-zäöüß]{0,8}( [A-Z][a-z]{0,8})?",
        "[A-Za-z0-9 ]{0,10}",
        prop::sample::select(default_lead_stages()),
        0.0f64..1.0e7,
        prop::option::of(0..LOCATIONS.len()),
    )
        .prop_map(|(name, company, stage, value, location)| LeadSeed {
            name,
            company,
            stage,
            value,
            location,
        })
}

fn customer_seed() -> impl Strategy<Value = CustomerSeed> {
    (
        "[A-ZÄÖÜ][a-zäöüß]{0,8}( GmbH| AG)?",
        prop::sample::select(CustomerStatus::ALL.to_vec()),
        prop::sample::subsequence(default_customer_tags(), 0..=3),
        0.0f64..5.0e4,
        prop::option::of(0..LOCATIONS.len()),
    )
        .prop_map(|(name, status, tags, mrr, location)| CustomerSeed {
            name,
            status,
            tags,
            mrr,
            location,
        })
}

fn snapshot() -> impl Strategy<Value = TrackerState> {
    (
        prop::collection::vec(lead_seed(), 0..16),
        prop::collection::vec(customer_seed(), 0..12),
    )
        .prop_map(|(leads, customers)| build_state(&leads, &customers))
}

fn build_state(leads: &[LeadSeed], customers: &[CustomerSeed]) -> TrackerState {
    let mut state = TrackerState::default();
    let mut location_ids = Vec::new();
    for name in LOCATIONS {
        let (next, id) = state
            .with_location_upserted(LocationInput::new(name))
            .unwrap();
        state = next;
        location_ids.push(id);
    }

    for seed in leads {
        state = state
            .with_lead_upserted(LeadInput {
                company: seed.company.clone(),
                stage: Some(seed.stage.clone()),
                value: seed.value,
                location_id: seed.location.map(|i| location_ids[i].clone()),
                ..LeadInput::new(seed.name.clone())
            })
            .unwrap()
            .0;
    }
    for seed in customers {
        state = state
            .with_customer_upserted(CustomerInput {
                status: seed.status,
                tags: seed.tags.clone(),
                mrr: seed.mrr,
                location_id: seed.location.map(|i| location_ids[i].clone()),
                ..CustomerInput::new(seed.name.clone())
            })
            .unwrap()
            .0;
    }
    state
}

fn search_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("gmbh".to_string()),
        "[a-zäöü]{1,2}",
    ]
}

/// Location filter by index; `Some(None)` selects records without a location
fn location_choice() -> impl Strategy<Value = Option<Option<usize>>> {
    prop::option::of(prop::option::of(0..LOCATIONS.len()))
}

fn resolve_location(state: &TrackerState, choice: Option<Option<usize>>) -> Filter<Option<String>> {
    match choice {
        None => Filter::All,
        Some(index) => Filter::Only(index.map(|i| state.locations[i].id.clone())),
    }
}

fn sort_direction() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
}

fn lead_field() -> impl Strategy<Value = LeadField> {
    prop::sample::select(vec![
        LeadField::Name,
        LeadField::Company,
        LeadField::Stage,
        LeadField::Location,
        LeadField::CreatedAt,
        LeadField::UpdatedAt,
        LeadField::Value,
    ])
}

fn customer_field() -> impl Strategy<Value = CustomerField> {
    prop::sample::select(vec![
        CustomerField::Name,
        CustomerField::Status,
        CustomerField::Tags,
        CustomerField::Location,
        CustomerField::Mrr,
        CustomerField::StartDate,
    ])
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * b.abs().max(1.0)
}

fn sorted_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut ids: Vec<&str> = ids.collect();
    ids.sort_unstable();
    ids
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn test_snapshot_round_trip(state in snapshot()) {
        let decoded = codec::deserialize(&codec::serialize(&state)).unwrap();
        prop_assert_eq!(decoded, state);
    }

    #[test]
    fn test_lead_view_is_the_matching_subset(
        state in snapshot(),
        search in search_text(),
        stage in prop::option::of(prop::sample::select(default_lead_stages())),
        location in location_choice(),
    ) {
        let query = LeadQuery {
            search,
            stage: stage.into(),
            location: resolve_location(&state, location),
        };
        let rows = query::leads(&state, &query, &SortSpec::default());

        for row in &rows {
            prop_assert!(state.leads.iter().any(|l| std::ptr::eq(l, *row)));
            prop_assert!(query.matches(row));
        }
        let expected = state.leads.iter().filter(|l| query.matches(l)).count();
        prop_assert_eq!(rows.len(), expected);
    }

    #[test]
    fn test_customer_view_is_the_matching_subset(
        state in snapshot(),
        search in search_text(),
        status in prop::option::of(prop::sample::select(CustomerStatus::ALL.to_vec())),
        location in location_choice(),
    ) {
        let query = CustomerQuery {
            search,
            status: status.into(),
            location: resolve_location(&state, location),
        };
        let sort = SortSpec::new(SortField::Customer(CustomerField::Name), SortDirection::Asc);
        let rows = query::customers(&state, &query, &sort);

        for row in &rows {
            prop_assert!(state.customers.iter().any(|c| std::ptr::eq(c, *row)));
            prop_assert!(query.matches(row));
        }
        let expected = state.customers.iter().filter(|c| query.matches(c)).count();
        prop_assert_eq!(rows.len(), expected);
    }

    #[test]
    fn test_lead_sort_is_an_ordered_permutation(
        state in snapshot(),
        field in lead_field(),
        direction in sort_direction(),
    ) {
        let sort = SortSpec::new(SortField::Lead(field), direction);
        let mut rows: Vec<_> = state.leads.iter().collect();
        query::sort_leads(&state, &mut rows, &sort);

        prop_assert_eq!(
            sorted_ids(rows.iter().map(|l| l.id.as_str())),
            sorted_ids(state.leads.iter().map(|l| l.id.as_str()))
        );
        for pair in rows.windows(2) {
            let ord = query::compare_values(
                &query::lead_value(&state, pair[0], field),
                &query::lead_value(&state, pair[1], field),
            );
            let ord = match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            prop_assert_ne!(ord, std::cmp::Ordering::Greater);
        }

        let mut again = rows.clone();
        query::sort_leads(&state, &mut again, &sort);
        let first: Vec<&str> = rows.iter().map(|l| l.id.as_str()).collect();
        let second: Vec<&str> = again.iter().map(|l| l.id.as_str()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_customer_sort_is_an_ordered_permutation(
        state in snapshot(),
        field in customer_field(),
        direction in sort_direction(),
    ) {
        let sort = SortSpec::new(SortField::Customer(field), direction);
        let mut rows: Vec<_> = state.customers.iter().collect();
        query::sort_customers(&state, &mut rows, &sort);

        prop_assert_eq!(
            sorted_ids(rows.iter().map(|c| c.id.as_str())),
            sorted_ids(state.customers.iter().map(|c| c.id.as_str()))
        );
        for pair in rows.windows(2) {
            let ord = query::compare_values(
                &query::customer_value(&state, pair[0], field),
                &query::customer_value(&state, pair[1], field),
            );
            let ord = match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            };
            prop_assert_ne!(ord, std::cmp::Ordering::Greater);
        }

        let mut again = rows.clone();
        query::sort_customers(&state, &mut again, &sort);
        let first: Vec<&str> = rows.iter().map(|c| c.id.as_str()).collect();
        let second: Vec<&str> = again.iter().map(|c| c.id.as_str()).collect();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_breakdowns_add_up(state in snapshot()) {
        let summary = stats::compute_stats(&state);

        let staged: usize = stats::leads_by_stage(&state).iter().map(|s| s.count).sum();
        prop_assert_eq!(staged, summary.leads);

        let by_status: f64 = stats::mrr_by_status(&state).iter().map(|s| s.mrr).sum();
        prop_assert!(close(by_status, summary.mrr), "{} != {}", by_status, summary.mrr);

        let total: f64 = state.leads.iter().map(|l| l.value).sum();
        let split = summary.pipeline + summary.won + summary.lost;
        prop_assert!(close(split, total), "{} != {}", split, total);
    }

    #[test]
    fn test_deleting_a_location_keeps_references_valid(
        state in snapshot(),
        index in 0..LOCATIONS.len(),
    ) {
        let id = state.locations[index].id.clone();
        let next = state.without_location(&id).unwrap();

        prop_assert!(integrity::check(&next).is_ok());
        prop_assert!(next.leads.iter().all(|l| l.location_id.as_deref() != Some(id.as_str())));
        prop_assert!(next
            .customers
            .iter()
            .all(|c| c.location_id.as_deref() != Some(id.as_str())));
        prop_assert_eq!(next.leads.len(), state.leads.len());
        prop_assert_eq!(next.customers.len(), state.customers.len());
    }
}
