// ==========================================
// 钢轨打磨排程系统 - 打磨排程引擎
// ==========================================
// 职责: 筛选 → 相邻合并 → 紧迫度优先填充预算 → 单段补位
// 输入: 剩余寿命估计 + 排程参数
// 输出: Selection（入选窗口 + 剩余预算）
// 红线: 预算约束优先于紧迫度，首个超预算的窗口处停止（不跳过继续）
// 红线: 贪心启发式，不做最优化；并列按原始顺序，结果确定
// ==========================================

use crate::config::SchedulerParams;
use crate::domain::life::LifeEstimate;
use crate::domain::maintenance::{BudgetConstraint, BudgetPool, MaintenanceWindow, Selection};
use crate::domain::types::WindowOrigin;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

// ==========================================
// MaintenanceScheduler - 打磨排程引擎
// ==========================================
pub struct MaintenanceScheduler {
    // 无状态引擎，每次调用独立
}

impl MaintenanceScheduler {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 排程
    ///
    /// 步骤：
    /// 1) 筛选 years_to_threshold <= eligibility_horizon_years 的段
    /// 2) 按里程单次扫描合并: 间隙 <= merge_gap_threshold 且当前游程长度
    ///    <= max_mergeable_run_length 时并入（终点取最大，年限取最小）
    /// 3) 游程按年限升序稳定排序，累加至首个超出预算的游程为止
    /// 4) 若仍有剩余，在未入选的原始段中补入一段可放下的最长段
    #[instrument(skip(self, estimates, params), fields(
        estimates_count = estimates.len(),
        budget = params.budget
    ))]
    pub fn schedule(&self, estimates: &[LifeEstimate], params: &SchedulerParams) -> Selection {
        // 1. 筛选（无年限的段永不入选）
        let mut eligible: Vec<(usize, &LifeEstimate, f64)> = estimates
            .iter()
            .enumerate()
            .filter_map(|(idx, e)| {
                e.years_to_threshold
                    .filter(|y| *y <= params.eligibility_horizon_years)
                    .map(|y| (idx, e, y))
            })
            .collect();
        eligible.sort_by(|a, b| a.1.km_start().total_cmp(&b.1.km_start()));

        // 2. 合并
        let mut runs = Self::merge_runs(&eligible, params);
        let merged_count = runs.len();

        debug!(
            eligible_count = eligible.len(),
            merged_count,
            "相邻段合并完成"
        );

        // 3. 紧迫度优先填充
        runs.sort_by(|a, b| a.years_to_threshold.total_cmp(&b.years_to_threshold));

        let mut pool = BudgetPool::new(params.budget, params.cost_per_unit_length);
        let mut windows: Vec<MaintenanceWindow> = Vec::new();
        for run in runs {
            if !pool.can_add_length(run.length) {
                debug!(
                    km_start = run.km_start,
                    length = run.length,
                    remaining_length = pool.remaining_length(),
                    "预算不足，停止填充"
                );
                break;
            }
            pool.take(run.length);
            windows.push(run);
        }

        // 4. 补位
        if pool.remaining_length() > 0.0 {
            if let Some(window) = Self::backfill(&eligible, &windows, &pool) {
                pool.take(window.length);
                windows.push(window);
            }
        }

        let total_length: f64 = windows.iter().map(|w| w.length).sum();
        let leftover_length = pool.remaining_length();

        info!(
            selected_windows = windows.len(),
            total_length,
            leftover_length,
            utilisation = pool.utilisation_ratio(),
            "打磨排程完成"
        );

        Selection {
            windows,
            total_length,
            budget_length: pool.budget_length,
            leftover_length,
            leftover_budget: leftover_length * params.cost_per_unit_length,
            eligible_count: eligible.len(),
            merged_count,
        }
    }

    // ==========================================
    // 辅助方法
    // ==========================================

    /// 单次前向扫描合并（输入已按里程排序）
    fn merge_runs(
        eligible: &[(usize, &LifeEstimate, f64)],
        params: &SchedulerParams,
    ) -> Vec<MaintenanceWindow> {
        let mut runs: Vec<MaintenanceWindow> = Vec::new();
        let mut current: Option<MaintenanceWindow> = None;

        for (idx, estimate, years) in eligible {
            let (km_start, km_end) = (estimate.km_start(), estimate.km_end());

            if let Some(run) = current.as_mut() {
                let gap = km_start - run.km_end;
                if gap <= params.merge_gap_threshold && run.length <= params.max_mergeable_run_length {
                    run.km_end = run.km_end.max(km_end);
                    run.length = run.km_end - run.km_start;
                    run.years_to_threshold = run.years_to_threshold.min(*years);
                    run.members.push(*idx);
                    continue;
                }
            }

            if let Some(closed) = current.take() {
                runs.push(closed);
            }
            current = Some(MaintenanceWindow {
                km_start,
                km_end,
                length: km_end - km_start,
                years_to_threshold: *years,
                members: vec![*idx],
                origin: WindowOrigin::Priority,
            });
        }

        if let Some(closed) = current {
            runs.push(closed);
        }
        runs
    }

    /// 未入选原始段中可放下的最长段（并列取里程靠前者）
    fn backfill(
        eligible: &[(usize, &LifeEstimate, f64)],
        selected: &[MaintenanceWindow],
        pool: &BudgetPool,
    ) -> Option<MaintenanceWindow> {
        let included: BTreeSet<usize> = selected
            .iter()
            .flat_map(|w| w.members.iter().copied())
            .collect();

        let mut best: Option<&(usize, &LifeEstimate, f64)> = None;
        for candidate in eligible {
            let length = candidate.1.length();
            if included.contains(&candidate.0) || !pool.can_add_length(length) {
                continue;
            }
            match best {
                Some(b) if length <= b.1.length() => {}
                _ => best = Some(candidate),
            }
        }

        best.map(|(idx, estimate, years)| {
            debug!(km_start = estimate.km_start(), length = estimate.length(), "补位入选");
            MaintenanceWindow {
                km_start: estimate.km_start(),
                km_end: estimate.km_end(),
                length: estimate.length(),
                years_to_threshold: *years,
                members: vec![*idx],
                origin: WindowOrigin::Backfill,
            }
        })
    }
}

// ==========================================
// Default trait 实现
// ==========================================
impl Default for MaintenanceScheduler {
    fn default() -> Self {
        Self::new()
    }
}
