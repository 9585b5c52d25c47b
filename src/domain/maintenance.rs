// ==========================================
// 钢轨打磨排程系统 - 打磨窗口领域模型
// ==========================================
// 红线: 预算约束优先于紧迫度
// 生命周期: 每次排程临时构造，核心层不持久化
// ==========================================

use crate::domain::types::WindowOrigin;
use serde::{Deserialize, Serialize};

// ==========================================
// MaintenanceWindow - 打磨窗口
// ==========================================
// 单个挂接段，或相邻挂接段合并后的游程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceWindow {
    pub km_start: f64,
    pub km_end: f64,
    pub length: f64,              // km_end - km_start（含合并间隙）
    pub years_to_threshold: f64,  // 成员最小值（最不利者决定）
    pub members: Vec<usize>,      // 成员在输入估计序列中的下标（按里程排序）
    pub origin: WindowOrigin,
}

// ==========================================
// BudgetPool - 预算池（以可打磨长度计）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetPool {
    pub budget_length: f64, // budget / cost_per_unit_length
    pub used_length: f64,
}

impl BudgetPool {
    pub fn new(budget: f64, cost_per_unit_length: f64) -> Self {
        Self {
            budget_length: budget / cost_per_unit_length,
            used_length: 0.0,
        }
    }

    pub fn take(&mut self, length: f64) {
        self.used_length += length;
    }
}

// ==========================================
// Trait: BudgetConstraint
// ==========================================
// 用途: Scheduler 预算约束检查接口
pub trait BudgetConstraint {
    /// 检查是否可加入指定长度
    fn can_add_length(&self, length: f64) -> bool;

    /// 剩余可打磨长度
    fn remaining_length(&self) -> f64;

    /// 预算利用率（0.0 - 1.0）
    fn utilisation_ratio(&self) -> f64;
}

impl BudgetConstraint for BudgetPool {
    /// # 返回
    /// - `true`: 加入后不超过 budget_length
    /// - `false`: 加入后会超过 budget_length
    fn can_add_length(&self, length: f64) -> bool {
        self.used_length + length <= self.budget_length
    }

    fn remaining_length(&self) -> f64 {
        (self.budget_length - self.used_length).max(0.0)
    }

    fn utilisation_ratio(&self) -> f64 {
        if self.budget_length <= 0.0 {
            return 0.0;
        }
        (self.used_length / self.budget_length).min(1.0)
    }
}

// ==========================================
// Selection - 排程结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub windows: Vec<MaintenanceWindow>, // 入选顺序（紧迫度优先，补位最后）
    pub total_length: f64,
    pub budget_length: f64,
    pub leftover_length: f64,
    pub leftover_budget: f64, // 未花费的预算金额（仅报告）
    pub eligible_count: usize,
    pub merged_count: usize,
}

impl Selection {
    /// 按里程排序的视图
    pub fn windows_by_position(&self) -> Vec<MaintenanceWindow> {
        let mut windows = self.windows.clone();
        windows.sort_by(|a, b| a.km_start.total_cmp(&b.km_start));
        windows
    }

    pub fn backfill(&self) -> Option<&MaintenanceWindow> {
        self.windows
            .iter()
            .find(|w| w.origin == WindowOrigin::Backfill)
    }
}
