use forecast_core::{FilterConfig, HOURS_TOLERANCE};
use forecast_matrix::{fill, MatrixFilterEngine, MatrixTransformer};
use forecast_test_utils::strategies::{staff_records, task_records, CLIENTS, SKILLS};
use forecast_test_utils::{horizon, sample_clients};
use proptest::prelude::*;

fn filter_config() -> impl Strategy<Value = FilterConfig> {
    (
        prop::sample::subsequence(SKILLS.to_vec(), 0..=SKILLS.len()),
        prop::sample::subsequence(CLIENTS.to_vec(), 0..=CLIENTS.len()),
        0..3u8,
        prop::sample::subsequence(vec!["s1", "S2", "s3"], 0..=3),
        0..15usize,
        0..15usize,
    )
        .prop_map(|(skills, clients, mode, staff, start, end)| {
            let config = FilterConfig::new()
                .with_skills(skills)
                .with_clients(clients)
                .with_month_range(start, end);
            match mode {
                0 => config,
                1 => config.with_preferred_staff(staff),
                _ => config.unassigned_only(),
            }
        })
}

proptest! {
    #[test]
    fn prop_built_matrix_is_dense(
        tasks in task_records(),
        staff in staff_records(),
        months in 1..18u32,
    ) {
        let matrix = MatrixTransformer::new()
            .build_matrix(&tasks, &sample_clients(), &staff, &horizon(months))
            .unwrap();

        prop_assert_eq!(matrix.months.len(), months as usize);
        prop_assert_eq!(matrix.data_points.len(), matrix.skills.len() * matrix.months.len());
        prop_assert!(matrix.is_dense());
    }

    #[test]
    fn prop_aggregates_match_breakdowns(
        tasks in task_records(),
        staff in staff_records(),
    ) {
        let matrix = MatrixTransformer::new()
            .build_matrix(&tasks, &sample_clients(), &staff, &horizon(12))
            .unwrap();

        let mut total = 0.0;
        for point in &matrix.data_points {
            prop_assert!(point.is_consistent(HOURS_TOLERANCE));
            prop_assert!(point.demand_hours >= 0.0);
            total += point.demand_hours;
        }
        prop_assert!((matrix.total_demand - total).abs() <= HOURS_TOLERANCE);

        for (skill, summary) in &matrix.skill_summary {
            let skill_total: f64 = matrix
                .data_points
                .iter()
                .filter(|p| &p.skill_type == skill)
                .map(|p| p.demand_hours)
                .sum();
            prop_assert!((summary.total_hours - skill_total).abs() <= HOURS_TOLERANCE);
        }
    }

    #[test]
    fn prop_filter_is_idempotent(
        tasks in task_records(),
        staff in staff_records(),
        config in filter_config(),
    ) {
        let matrix = MatrixTransformer::new()
            .build_matrix(&tasks, &sample_clients(), &staff, &horizon(12))
            .unwrap();
        let engine = MatrixFilterEngine::new();

        let once = engine.apply_filter(&matrix, &config);
        let twice = engine.apply_filter(&once, &config);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_filter_never_adds_demand(
        tasks in task_records(),
        staff in staff_records(),
        config in filter_config(),
    ) {
        let matrix = MatrixTransformer::new()
            .build_matrix(&tasks, &sample_clients(), &staff, &horizon(12))
            .unwrap();
        let filtered = MatrixFilterEngine::new().apply_filter(&matrix, &config);

        prop_assert!(filtered.total_demand <= matrix.total_demand + HOURS_TOLERANCE);
        prop_assert!(filtered.total_tasks <= matrix.total_tasks);
        prop_assert!(filtered.is_dense());
        prop_assert!(!filtered.months.is_empty());
    }

    #[test]
    fn prop_fill_of_dense_matrix_is_identity(
        tasks in task_records(),
        staff in staff_records(),
    ) {
        let matrix = MatrixTransformer::new()
            .build_matrix(&tasks, &sample_clients(), &staff, &horizon(6))
            .unwrap();
        let filled = fill(&matrix, &matrix.skills, &matrix.months);
        prop_assert_eq!(filled, matrix);
    }
}
