//! 配置加载示例
//!
//! 演示如何从文件加载配置、使用环境变量覆盖并校验

use stompix_config::{HeartbeatConfig, ServerConfig};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== stompix 配置加载示例 ===\n");

    // 示例 1: 使用默认配置
    println!("1. 使用默认配置:");
    let config = ServerConfig::default();
    println!("{}", config.summary());
    println!();

    // 示例 2: 从文件加载配置，再应用 STOMPIX_* 环境变量
    println!("2. 从文件加载配置:");
    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("examples/config_example.toml");
    match ServerConfig::from_file_with_env(&config_path) {
        Ok(config) => {
            println!("   ✓ 配置加载成功");
            println!("{}", config.summary());
        }
        Err(e) => {
            println!("   ✗ 配置加载失败: {}", e);
        }
    }
    println!();

    // 示例 3: 心跳能力字符串
    println!("3. 解析心跳能力:");
    match HeartbeatConfig::parse("0,8000") {
        Some(heartbeat) => println!(
            "   接收: {}ms, 发送: {}ms",
            heartbeat.min_incoming_ms, heartbeat.min_outgoing_ms
        ),
        None => println!("   ✗ 格式错误"),
    }
    println!();

    // 示例 4: 无效配置
    println!("4. 无效配置示例:");
    let invalid_config = ServerConfig {
        server_name: "bad\nname".to_string(),
        ..Default::default()
    };
    match invalid_config.validate() {
        Ok(_) => println!("   ✓ 配置有效"),
        Err(e) => println!("   ✗ 配置无效: {}", e),
    }

    Ok(())
}
