// ==========================================
// 集成测试公共辅助
// ==========================================

pub mod test_data_builder;
