// ==========================================
// 模切机生产记录系统 - 命令行入口
// ==========================================
// 用法:
//   diecut-tracker summary [YYYY-MM-DD]
//   diecut-tracker history [YYYY-MM] [circle|flat]
//   diecut-tracker export <path>
//   diecut-tracker import <path>
//   diecut-tracker delete-month <YYYY-MM>
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, Utc};

use diecut_tracker::api::{
    export_file_name, format_integer, format_number, DeletePlan, DeleteScope, HistoryFilter,
};
use diecut_tracker::app::{get_default_db_path, AppState};
use diecut_tracker::i18n::t;
use diecut_tracker::{logging, MachineType, APP_NAME, VERSION};

const USAGE: &str = "用法: diecut-tracker <summary [YYYY-MM-DD] | history [YYYY-MM] [circle|flat] | export [path] | import <path> | delete-month <YYYY-MM>>";

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    tracing::info!("{} v{} 启动", APP_NAME, VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let db_path = get_default_db_path();
    tracing::info!("数据库路径: {}", db_path);
    let mut state = AppState::new(db_path).context("无法打开生产记录数据库")?;

    match command.as_str() {
        "summary" => print_summary(&state, rest.first().map(String::as_str))?,
        "history" => print_history(&state, rest)?,
        "export" => {
            let today = Local::now().date_naive();
            let path = rest.first().cloned().unwrap_or_else(|| export_file_name(today));
            let count = state.production.export_to_file(&path, Utc::now()).await?;
            println!("已导出 {} 条记录到 {}", count, path);
        }
        "import" => {
            let path = rest.first().ok_or_else(|| anyhow!(USAGE))?;
            let summary = state.production.import_file(path).await?;
            println!(
                "导入 {} 条，跳过无效 {} 条，跳过重复 {} 条，当前共 {} 条{}",
                summary.imported,
                summary.skipped_invalid,
                summary.skipped_duplicate,
                summary.total,
                if summary.settings_merged { "（设置已合并）" } else { "" }
            );
        }
        "delete-month" => {
            let month = rest.first().ok_or_else(|| anyhow!(USAGE))?;
            let (year, month) = HistoryFilter::parse_month(month)?;
            let plan = state.production.plan_delete(&DeleteScope::Month { year, month })?;
            match plan {
                DeletePlan::NothingToDelete => println!("{}", t("common.nothing_to_delete")),
                DeletePlan::Pending { .. } => {
                    let removed = state.production.execute_delete(&plan)?;
                    println!("已删除 {} 条记录", removed);
                }
            }
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }

    Ok(())
}

fn print_summary(state: &AppState, date: Option<&str>) -> Result<()> {
    let today = match date {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .with_context(|| format!("无效的日期: {}", text))?,
        None => Local::now().date_naive(),
    };

    let dashboard = state.dashboard();
    let overview = dashboard.today_overview(today);

    println!("== {} {} ==", APP_NAME, overview.date);
    println!("总目标: {}", format_integer(overview.nominal_target));
    for machine in &overview.machines {
        println!(
            "{}: {} 条记录, {} 刀, 进度 {}% ({:?})",
            machine.machine_type.label(),
            machine.record_count,
            machine.total_cuts,
            format_number(machine.progress_pct),
            machine.level
        );
    }
    println!(
        "合计: {} 刀, 加班 {} 小时",
        overview.total_cuts,
        format_number(overview.total_overtime_hours)
    );

    for card in dashboard.today_record_cards(today) {
        println!(
            "#{} {} [{}] {}-{} 刀数 {} 完成数 {} 目标 {} 完成率 {}% 加班 {}h",
            card.sequence_number,
            card.product_name,
            card.machine_type.label(),
            card.start_time.format("%H:%M"),
            card.end_time.format("%H:%M"),
            card.cuts,
            card.finished_units,
            format_integer(card.daily_target),
            format_number(card.completion_pct),
            format_number(card.overtime_hours)
        );
    }
    Ok(())
}

fn print_history(state: &AppState, args: &[String]) -> Result<()> {
    let mut filter = HistoryFilter::default();
    for arg in args {
        if let Ok(machine_type) = arg.parse::<MachineType>() {
            filter.machine_type = Some(machine_type);
        } else {
            filter.month = Some(HistoryFilter::parse_month(arg)?);
        }
    }

    let days = state.dashboard().history(&filter);
    if days.is_empty() {
        println!("没有历史记录");
        return Ok(());
    }

    for day in days {
        println!(
            "== {} 共 {} 刀, 加班 {} 小时 ==",
            day.date,
            day.total_cuts,
            format_number(day.total_overtime_hours)
        );
        for stat in &day.machines {
            println!(
                "  {}: {} 条, 目标 {}, 实际 {}, 差值 {}",
                stat.machine_type.label(),
                stat.record_count,
                format_integer(stat.target_cuts),
                stat.actual_cuts,
                format_integer(stat.difference)
            );
        }
    }
    Ok(())
}
