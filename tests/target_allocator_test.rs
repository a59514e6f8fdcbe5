// ==========================================
// TargetAllocator 集成测试
// ==========================================
// 测试范围:
// 1. 参考场景的日目标
// 2. 可用工时按工作小时比例分配
// 3. 扣减超过分配工时时目标为 0
// ==========================================

mod test_helpers;

use diecut_tracker::api::format_integer;
use diecut_tracker::config::Settings;
use diecut_tracker::domain::{MachineType, ShiftRecord};
use diecut_tracker::engine::{completion_percentage, RecordAggregator, TargetAllocator};
use test_helpers::{build_record, draft, reference_day_drafts};

fn reference_records(settings: &Settings) -> Vec<ShiftRecord> {
    reference_day_drafts()
        .iter()
        .enumerate()
        .map(|(i, d)| build_record(d, settings, i as u64 + 1))
        .collect()
}

#[test]
fn test_reference_scenario_targets() {
    let settings = Settings::default();
    let records = reference_records(&settings);
    let day: Vec<&ShiftRecord> = records.iter().collect();

    let allocation = TargetAllocator::new(&settings).allocate_day(&day);

    // 8 - (30 + 20) / 60
    assert!((allocation.total_available_hours - 43.0 / 6.0).abs() < 1e-9);
    // 圆模 8.0 + 平压 7.5
    assert!((allocation.total_worked_hours - 15.5).abs() < 1e-9);

    let circle = allocation.get(MachineType::Circle).unwrap();
    assert!((circle.allocated_hours - 3.698_924_7).abs() < 1e-6);
    assert_eq!(format_integer(circle.target_cuts), "21556.00");
    assert_eq!(circle.actual_cuts, 20_000);
    assert!(circle.difference < 0.0);

    let flat = allocation.get(MachineType::Flat).unwrap();
    assert_eq!(format_integer(flat.target_cuts), "40806.00");
    assert!((flat.completion_pct - 38_000.0 / flat.target_cuts * 100.0).abs() < 1e-9);
}

#[test]
fn test_daily_target_matches_allocate_day() {
    let settings = Settings::default();
    let records = reference_records(&settings);
    let day: Vec<&ShiftRecord> = records.iter().collect();

    let aggregator = RecordAggregator::new();
    let available = aggregator.total_available_hours(day.iter().copied());
    let worked = aggregator.total_worked_hours(day.iter().copied());

    let allocator = TargetAllocator::new(&settings);
    let allocation = allocator.allocate_day(&day);
    for machine_type in MachineType::ALL {
        let target = allocator.daily_target(machine_type, &day, available, worked);
        assert_eq!(target, allocation.get(machine_type).unwrap().target_cuts);
    }
}

#[test]
fn test_allocated_hours_are_proportional_to_worked_hours() {
    let settings = Settings::default();
    let records = vec![
        build_record(
            &draft("circle", "P1", "2025-03-14T08:00", "2025-03-14T12:30", 0, 100),
            &settings,
            1,
        ),
        build_record(
            &draft("flat", "P2", "2025-03-14T08:00", "2025-03-14T17:30", 0, 100),
            &settings,
            2,
        ),
    ];
    let day: Vec<&ShiftRecord> = records.iter().collect();

    let allocation = TargetAllocator::new(&settings).allocate_day(&day);
    let circle = allocation.get(MachineType::Circle).unwrap();
    let flat = allocation.get(MachineType::Flat).unwrap();

    // 两类分配之和等于总可用工时
    assert!(
        (circle.allocated_hours + flat.allocated_hours - allocation.total_available_hours).abs()
            < 1e-9
    );
    // 比例等于工作小时之比（4.0 : 9.0）
    assert!((circle.allocated_hours / flat.allocated_hours - 4.0 / 9.0).abs() < 1e-9);
}

#[test]
fn test_single_machine_day_takes_all_available_hours() {
    let settings = Settings::default();
    let records = vec![build_record(
        &draft("circle", "P1", "2025-03-14T08:00", "2025-03-14T16:30", 0, 100),
        &settings,
        1,
    )];
    let day: Vec<&ShiftRecord> = records.iter().collect();

    let allocation = TargetAllocator::new(&settings).allocate_day(&day);
    let circle = allocation.get(MachineType::Circle).unwrap();
    let flat = allocation.get(MachineType::Flat).unwrap();

    assert!((circle.allocated_hours - 8.0).abs() < 1e-9);
    assert!((circle.target_cuts - (8.0 - 0.25) * 6_250.0).abs() < 1e-6);
    assert_eq!(flat.allocated_hours, 0.0);
    assert_eq!(flat.target_cuts, 0.0);
}

#[test]
fn test_target_is_zero_when_setup_consumes_the_day() {
    let settings = Settings::default();
    let records = vec![build_record(
        &draft("flat", "P1", "2025-03-14T08:00", "2025-03-14T16:00", 600, 500),
        &settings,
        1,
    )];
    let day: Vec<&ShiftRecord> = records.iter().collect();

    let allocation = TargetAllocator::new(&settings).allocate_day(&day);
    assert_eq!(allocation.total_available_hours, 0.0);

    let flat = allocation.get(MachineType::Flat).unwrap();
    assert_eq!(flat.target_cuts, 0.0);
    assert_eq!(flat.completion_pct, 0.0);
    assert_eq!(flat.difference, 500.0);
    assert_eq!(completion_percentage(500.0, 0.0), 0.0);
}

#[test]
fn test_remark_deduction_reduces_available_hours() {
    let settings = Settings::default();
    let mut with_remark = draft("circle", "P1", "2025-03-14T08:00", "2025-03-14T16:30", 0, 100);
    with_remark.remarks = "停机30分钟".to_string();
    let records = vec![build_record(&with_remark, &settings, 1)];

    let available = RecordAggregator::new().total_available_hours(records.iter());
    assert!((available - 7.5).abs() < 1e-9);
}
