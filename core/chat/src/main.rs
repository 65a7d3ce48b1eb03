mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::io;
use std::process;

use cli::{parse_args, print_completion, Config, ParseOutcome};
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use domain::ConversationMemory;
use ports::inbound::UseCaseRunner;
use wiring::{wire_chat, App};

/// 対話ループを標準入出力で動かす Runner
struct Runner {
    app: App,
}

impl UseCaseRunner for Runner {
    fn run(&self, config: Config) -> Result<i32, Error> {
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command started")
                .layer("cli")
                .kind("lifecycle")
                .field("profile", &self.app.profile_name)
                .field("memory_file", config.memory_file.display().to_string())
                .field("fresh", config.fresh),
        );

        let mut memory = ConversationMemory::new(self.app.memory_config);
        let stdin = io::stdin();
        let result = self.app.chat_app.run(
            &mut memory,
            !config.fresh,
            &mut stdin.lock(),
            &mut io::stdout(),
            &mut io::stderr(),
        );

        let code = finished_exit_code(&result);
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command finished")
                .layer("cli")
                .kind("lifecycle")
                .field("exit_code", code)
                .field("history_len", memory.len()),
        );
        if let Err(ref e) = result {
            let _ = self
                .app
                .logger
                .log(&LogRecord::new(LogLevel::Error, e.to_string()).layer("cli").kind("error"));
        }
        result
    }
}

/// 終了ログに載せる終了コード（エラーならそのエラーの終了コード）
fn finished_exit_code(result: &Result<i32, Error>) -> i32 {
    match result {
        Ok(code) => *code,
        Err(e) => e.exit_code(),
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("chat: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    dotenv::dotenv().ok();
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
    };
    if config.help {
        print_help();
        return Ok(0);
    }
    let app = wire_chat(&config)?;
    let runner = Runner { app };
    runner.run(config)
}

fn print_usage() {
    eprintln!("Usage: chat [options]");
}

fn print_help() {
    println!("Usage: chat [options]");
    println!("Options:");
    println!("  -h, --help                     Show this help message");
    println!("  -v, --verbose                  Emit verbose debug logs to stderr");
    println!("  --fresh                        Start without loading the saved conversation");
    println!("  --csv <path>                   Business report CSV (default: \"Business report.csv\")");
    println!("  --prompt <path>                System prompt file (default: prompt.txt)");
    println!("  --memory-file <path>           Saved conversation (default: conversation_memory.json)");
    println!("  --log-file <path>              Append JSONL logs to this file");
    println!("  -p, --profile <profile>        LLM profile (anthropic, openai, openai_compat, echo, or a profiles.json entry)");
    println!("  -m, --model <model>            Model name. Default: profile default");
    println!("  --max-recent <n>               Newest messages sent verbatim (default: 4)");
    println!("  --compaction-trigger <n>       Summarize older messages once history exceeds n (default: 12)");
    println!("  --excerpt-chars <n>            Per-message character limit when summarizing (default: 200)");
    println!("  --generate <shell>             Generate shell completion script (bash, zsh, fish, ...)");
    println!();
    println!("Commands (at the You: prompt):");
    println!("  quit | exit | q                Save the conversation and exit (EOF does the same)");
    println!("  clear                          Forget history and summaries");
    println!("  save                           Save the conversation now");
    println!("  stats                          Show message count, summaries and estimated context tokens");
    println!();
    println!("Environment:");
    println!("  ANTHROPIC_API_KEY   API key for the default anthropic profile");
    println!("  OPENAI_API_KEY      API key for the openai profile");
    println!("  CHAT_PROFILES       Path to a profiles.json (default_provider + providers)");
    println!("  A .env file in the current directory is loaded at startup.");
}
