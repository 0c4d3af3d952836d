use crate::root::RootStrategy;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "rusub-merge - 多源子域结果聚合：去重、规范化、按根域归类",
    after_help = "示例:\n  rusub-merge recon example.com --tools amass,subfinder -o domains.txt\n  rusub-merge merge example.com -i amass.txt -i subfinder.txt --crtsh-json crtsh_domains.json\n  cat hosts.txt | rusub-merge merge example.com --stdin --output-type json -o domains.json.gz\n  rusub-merge root api.example.co.uk --root-strategy psl"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 运行外部枚举工具与 crt.sh 查询，然后聚合输出
    #[command(alias = "r")]
    Recon(ReconArgs),
    /// 仅聚合已有的工具输出文件 / crt.sh 响应 / stdin
    #[command(alias = "m")]
    Merge(MergeArgs),
    /// 打印每个主机名对应的根域（调试根域策略）
    Root(RootArgs),
}

/// Report and logging options shared by recon/merge
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// 目标域名
    #[arg(value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// 输出文件路径；.gz 后缀自动启用 gzip
    #[arg(short = 'o', long = "output", default_value = "domains.txt")]
    pub output: PathBuf,

    /// 输出类型: txt/json
    #[arg(long = "output-type", alias = "oy", default_value = "txt", value_parser = ["txt", "json"])]
    pub output_type: String,

    /// 使用 gzip 压缩
    #[arg(long = "gzip")]
    pub gzip: bool,

    /// 根域判定策略: heuristic (末两级标签) / psl (公共后缀列表)
    #[arg(long = "root-strategy", value_enum, default_value_t = RootStrategy::Heuristic)]
    pub root_strategy: RootStrategy,

    /// 额外从 stdin 读取候选主机名
    #[arg(long = "stdin")]
    pub stdin: bool,

    /// 日志级别: error|warn|info|debug|trace|silent
    #[arg(long = "log-level", default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace", "silent"])]
    pub log_level: String,
}

#[derive(Args, Debug)]
pub struct ReconArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// 启用的工具，逗号分隔或可重复
    #[arg(long = "tools", default_value = "amass,subfinder,waymore,gau")]
    pub tools: Vec<String>,

    /// 跳过 crt.sh 查询
    #[arg(long = "no-crtsh")]
    pub no_crtsh: bool,

    /// 单个工具超时 (秒)
    #[arg(long = "tool-timeout", default_value_t = 1800)]
    pub tool_timeout: u64,

    /// crt.sh 请求超时 (秒)
    #[arg(long = "crtsh-timeout", default_value_t = 10)]
    pub crtsh_timeout: u64,

    /// crt.sh 原始响应保存路径
    #[arg(long = "crtsh-raw", default_value = "crtsh_domains.json")]
    pub crtsh_raw: PathBuf,

    /// 保留工具输出的目录（默认临时目录，结束后删除）
    #[arg(long = "work-dir")]
    pub work_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// 工具输出文件，每行一个主机名或 URL，可重复
    #[arg(short = 'i', long = "input")]
    pub inputs: Vec<PathBuf>,

    /// 已保存的 crt.sh JSON 响应
    #[arg(long = "crtsh-json")]
    pub crtsh_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RootArgs {
    /// 主机名
    #[arg(value_name = "HOST")]
    pub hosts: Vec<String>,

    /// 从 stdin 读取主机名
    #[arg(long = "stdin")]
    pub stdin: bool,

    #[arg(long = "root-strategy", value_enum, default_value_t = RootStrategy::Heuristic)]
    pub root_strategy: RootStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_recon_defaults() {
        let cli = Cli::parse_from(["rusub-merge", "recon", "example.com", "--tools", "amass,gau"]);
        match cli.command {
            Commands::Recon(a) => {
                assert_eq!(a.common.domain.as_deref(), Some("example.com"));
                assert_eq!(a.tools, vec!["amass,gau".to_string()]);
                assert_eq!(a.crtsh_timeout, 10);
                assert_eq!(a.common.output, PathBuf::from("domains.txt"));
                assert_eq!(a.common.root_strategy, RootStrategy::Heuristic);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_merge_alias() {
        let cli = Cli::parse_from(["rusub-merge", "m", "example.com", "-i", "a.txt", "-i", "b.txt", "--root-strategy", "psl"]);
        match cli.command {
            Commands::Merge(a) => {
                assert_eq!(a.inputs.len(), 2);
                assert_eq!(a.common.root_strategy, RootStrategy::Psl);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
