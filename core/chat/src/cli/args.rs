use crate::adapter::DEFAULT_MEMORY_FILENAME;
use crate::domain::memory_config::{
    DEFAULT_COMPACTION_TRIGGER, DEFAULT_MAX_EXCERPT_CHARS, DEFAULT_MAX_RECENT_MESSAGES,
};
use crate::domain::MemoryConfig;
use clap::builder::ArgAction;
use clap::value_parser;
use clap_complete::Shell;
use common::error::Error;
use std::path::PathBuf;

pub const DEFAULT_CSV_PATH: &str = "Business report.csv";
pub const DEFAULT_PROMPT_PATH: &str = "prompt.txt";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub help: bool,
    /// -v / --verbose: 構造化ログを stderr にも出す
    pub verbose: bool,
    /// --fresh: 保存済みの会話を読み込まずに始める
    pub fresh: bool,
    pub csv: PathBuf,
    pub prompt: PathBuf,
    pub memory_file: PathBuf,
    /// --log-file: JSONL ログの出力先（未指定ならファイルには書かない）
    pub log_file: Option<PathBuf>,
    pub profile: Option<String>,
    pub model: Option<String>,
    pub max_recent: usize,
    pub compaction_trigger: usize,
    pub excerpt_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            help: false,
            verbose: false,
            fresh: false,
            csv: PathBuf::from(DEFAULT_CSV_PATH),
            prompt: PathBuf::from(DEFAULT_PROMPT_PATH),
            memory_file: PathBuf::from(DEFAULT_MEMORY_FILENAME),
            log_file: None,
            profile: None,
            model: None,
            max_recent: DEFAULT_MAX_RECENT_MESSAGES,
            compaction_trigger: DEFAULT_COMPACTION_TRIGGER,
            excerpt_chars: DEFAULT_MAX_EXCERPT_CHARS,
        }
    }
}

impl Config {
    /// CLI の値から MemoryConfig を作る（anchor_len は固定の既定値）
    pub fn memory_config(&self) -> Result<MemoryConfig, Error> {
        let config = MemoryConfig {
            max_recent_messages: self.max_recent,
            compaction_trigger: self.compaction_trigger,
            max_excerpt_chars: self.excerpt_chars,
            ..MemoryConfig::default()
        };
        config.validate()?;
        Ok(config)
    }
}

/// 解析結果: 通常の Config / 補完スクリプト生成
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("chat")
        .about("Chat about a business report with bounded conversation memory")
        .disable_help_flag(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Emit verbose debug logs to stderr (for troubleshooting)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("fresh")
                .long("fresh")
                .help("Start without loading the saved conversation")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("csv")
                .long("csv")
                .value_name("path")
                .help("Business report CSV file")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("prompt")
                .long("prompt")
                .value_name("path")
                .help("System prompt file")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("memory-file")
                .long("memory-file")
                .value_name("path")
                .help("Where the conversation is saved and restored")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("log-file")
                .long("log-file")
                .value_name("path")
                .help("Append JSONL logs to this file")
                .value_parser(value_parser!(PathBuf))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("profile")
                .short('p')
                .long("profile")
                .value_name("profile")
                .help("Specify LLM profile (anthropic, openai, echo, etc.)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("model")
                .short('m')
                .long("model")
                .value_name("model")
                .help("Specify model name (e.g. claude-3-7-sonnet-20250219)")
                .num_args(1),
        )
        .arg(
            clap::Arg::new("max-recent")
                .long("max-recent")
                .value_name("n")
                .help("Number of newest messages sent verbatim")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("compaction-trigger")
                .long("compaction-trigger")
                .value_name("n")
                .help("Compress older messages once history exceeds this length")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("excerpt-chars")
                .long("excerpt-chars")
                .value_name("n")
                .help("Per-message character limit in the text sent for summarization")
                .value_parser(value_parser!(usize))
                .num_args(1),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let defaults = Config::default();
    let path = |id: &str, default: PathBuf| matches.get_one::<PathBuf>(id).cloned().unwrap_or(default);
    let count = |id: &str, default: usize| matches.get_one::<usize>(id).copied().unwrap_or(default);

    Config {
        help: matches.get_flag("help"),
        verbose: matches.get_flag("verbose"),
        fresh: matches.get_flag("fresh"),
        csv: path("csv", defaults.csv),
        prompt: path("prompt", defaults.prompt),
        memory_file: path("memory-file", defaults.memory_file),
        log_file: matches.get_one::<PathBuf>("log-file").cloned(),
        profile: matches.get_one::<String>("profile").cloned(),
        model: matches.get_one::<String>("model").cloned(),
        max_recent: count("max-recent", defaults.max_recent),
        compaction_trigger: count("compaction-trigger", defaults.compaction_trigger),
        excerpt_chars: count("excerpt-chars", defaults.excerpt_chars),
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches()
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    outcome_from_matches(&matches)
}

/// テスト用: 引数スライスから解析する
#[allow(dead_code)]
pub fn parse_args_from(args: &[&str]) -> Result<ParseOutcome, Error> {
    let matches = build_clap_command()
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    outcome_from_matches(&matches)
}

fn outcome_from_matches(matches: &clap::ArgMatches) -> Result<ParseOutcome, Error> {
    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }
    Ok(ParseOutcome::Config(matches_to_config(matches)))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "chat", &mut std::io::stdout());
}
