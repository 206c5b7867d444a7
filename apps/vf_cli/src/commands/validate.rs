// apps/vf_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 解析配置文件并执行 `FlowConfig::validate`，再给出不致命的提示。

use anyhow::{bail, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use vf_config::{FlowConfig, MarkerKind};

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== ViscoFlow 配置验证 ===");

    let mut result = ValidationResult::default();
    validate_config(&args.config, &mut result);
    print_validation_result(&result, args.strict)
}

fn validate_config(path: &Path, result: &mut ValidationResult) {
    println!("\n检查配置文件: {}", path.display());

    if !path.exists() {
        result.add_error(format!("配置文件不存在: {}", path.display()));
        return;
    }

    // from_file 内已执行 validate
    let config = match FlowConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            result.add_error(e.to_string());
            return;
        }
    };
    println!("  ✓ 配置文件格式有效");

    check_advisories(&config, result);
}

/// 合法但可疑的设置
fn check_advisories(config: &FlowConfig, result: &mut ValidationResult) {
    if config.markers.is_empty() {
        result.add_warning("未定义任何边界标记，所有网格标记都将视为分区交界");
    }
    if !config.markers.iter().any(|m| m.kind.is_wall()) {
        result.add_warning("没有壁面标记，不会产生粘性力系数");
    }
    if config.freestream.velocity == 0.0 {
        result.add_warning("来流速度为 0，动压为 0，系数无法归一化");
    }
    if config.time.cfl > 10.0 {
        result.add_warning(format!("CFL = {} 较大，显式推进可能不稳定", config.time.cfl));
    }
    for marker in &config.markers {
        if marker.monitoring && !marker.kind.is_physical() {
            result.add_warning(format!("标记 '{}' 为非物理边界，监控标志无效", marker.name));
        }
        if marker.fluid_load && !marker.kind.is_wall() {
            result.add_warning(format!("标记 '{}' 不是壁面，顶点载荷不代表结构受力", marker.name));
        }
        if let MarkerKind::IsothermalWall { temperature } = marker.kind {
            let ratio = temperature / config.freestream.temperature;
            if !(0.2..=5.0).contains(&ratio) {
                result.add_warning(format!("标记 '{}' 壁温与来流温度相差过大: {} K", marker.name, temperature));
            }
        }
    }
    for surface in &config.monitoring_surfaces {
        if surface.markers.is_empty() {
            result.add_warning(format!("监控面 '{}' 不含任何标记", surface.name));
        }
    }
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!("\n=== 验证结果 ===");

    if !result.errors.is_empty() {
        println!("\n错误 ({}):", result.errors.len());
        for err in &result.errors {
            error!("  ✗ {}", err);
            println!("  ✗ {}", err);
        }
    }

    if !result.warnings.is_empty() {
        println!("\n警告 ({}):", result.warnings.len());
        for warning in &result.warnings {
            warn!("  ⚠ {}", warning);
            println!("  ⚠ {}", warning);
        }
    }

    let success = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if success {
        println!("\n✓ 验证通过");
        Ok(())
    } else {
        println!("\n✗ 验证失败");
        bail!(
            "验证失败：发现 {} 个错误，{} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::run::flat_plate_config;

    #[test]
    fn test_flat_plate_config_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.json");
        flat_plate_config().save_to_file(&path).unwrap();

        let mut result = ValidationResult::default();
        validate_config(&path, &mut result);
        assert!(result.is_ok_strict(), "{:?} {:?}", result.errors, result.warnings);
    }

    #[test]
    fn test_invalid_config_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut config = flat_plate_config();
        config.time.cfl = -1.0;
        config.save_to_file(&path).unwrap();

        let mut result = ValidationResult::default();
        validate_config(&path, &mut result);
        assert!(!result.is_ok());
    }

    #[test]
    fn test_missing_file() {
        let mut result = ValidationResult::default();
        validate_config(Path::new("/nonexistent/vf.json"), &mut result);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_no_walls_warns() {
        let mut config = flat_plate_config();
        config.markers.remove(0);
        config.monitoring_surfaces.clear();
        let mut result = ValidationResult::default();
        check_advisories(&config, &mut result);
        assert!(result.is_ok());
        assert!(!result.is_ok_strict());
    }
}
