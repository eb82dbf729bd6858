//! webpify 命令行入口

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use webpify::config::load_options;
use webpify::core::{
    collect, print_error_message, print_info_message, replace, use_color, Artifact, Document,
    WebpOptions, WebpResult,
};
use webpify::env::{self, EnvVar};
use webpify::utils::{normalize_path, ImageTypes};

#[derive(Parser, Debug)]
#[command(name = "webpify")]
#[command(version, about = "Rewrite HTML and CSS image references for WebP delivery", long_about = None)]
#[command(after_help = "EXAMPLES:
    webpify replace dist/index.html             Rewrite in place
    webpify replace -o out dist/*.html          Write rewritten files under out/
    webpify collect --root dist -o images dist/index.html")]
struct Cli {
    #[command(flatten)]
    options: OptionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite image tags and append WebP rules to referenced stylesheets
    Replace {
        /// HTML documents to process
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },

    /// Copy every referenced image so it can be converted to WebP
    Collect {
        /// HTML documents to scan
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct OptionArgs {
    /// Config file (default: webpify.toml, .webpify.toml, ~/.config/webpify/config.toml)
    #[arg(short = 'C', long, global = true, value_hint = clap::ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Marker class added to rewritten tags
    #[arg(long, global = true)]
    class_name: Option<String>,

    /// Eligible image extensions, comma-separated
    #[arg(long, global = true)]
    image_types: Option<String>,

    /// Tags containing this text are left untouched
    #[arg(long, global = true)]
    ignore_attr: Option<String>,

    /// Selector prefix of generated WebP rules
    #[arg(long = "css-prefix", global = true)]
    css_rule_prefix: Option<String>,

    /// Directory that `/`-rooted references resolve against
    #[arg(long = "root", global = true, value_hint = clap::ValueHint::DirPath)]
    source_root: Option<PathBuf>,

    /// Write results under this directory instead of in place
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    output_dir: Option<PathBuf>,

    /// Charset of the HTML documents (default: utf-8)
    #[arg(short, long, global = true)]
    encoding: Option<String>,

    /// Only print errors
    #[arg(short, long, global = true)]
    silent: bool,
}

impl OptionArgs {
    fn apply(&self, options: &mut WebpOptions) {
        if let Some(class_name) = &self.class_name {
            options.class_name = class_name.clone();
        }
        if let Some(image_types) = &self.image_types {
            options.image_types = ImageTypes::parse(image_types);
        }
        if let Some(ignore_attr) = &self.ignore_attr {
            options.ignore_attr = ignore_attr.clone();
        }
        if let Some(prefix) = &self.css_rule_prefix {
            options.css_rule_prefix = prefix.clone();
        }
        if let Some(source_root) = &self.source_root {
            options.source_root = source_root.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            options.output_base = Some(output_dir.clone());
        }
        if let Some(encoding) = &self.encoding {
            options.encoding = Some(encoding.clone());
        }
        options.silent |= self.silent;
    }
}

fn init_tracing(silent: bool) {
    let level = if silent {
        "error".to_string()
    } else {
        env::core::LogLevel::get().unwrap_or_else(|e| {
            print_error_message(&e.to_string());
            "info".to_string()
        })
    };
    let level = level.parse().unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(use_color())
        .with_writer(std::io::stderr)
        .init();
}

fn write_artifact(artifact: &Artifact) -> WebpResult<()> {
    if let Some(parent) = artifact.path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&artifact.path, &artifact.contents)?;
    Ok(())
}

/// 有输出目录时把路径移到输出目录下，否则原地覆盖
fn output_path(path: &Path, options: &WebpOptions) -> PathBuf {
    options
        .resolver()
        .rebase(&normalize_path(path), options.output_base.as_deref())
}

/// `written` 记录本次运行已写出的样式表，多个文档共用的样式表只改写一次
fn replace_document(
    file: &Path,
    options: &WebpOptions,
    written: &mut HashSet<PathBuf>,
) -> WebpResult<()> {
    let document = Document::read(file)?;
    let output = replace(&document, options)?;

    write_artifact(&Artifact {
        path: output_path(&document.path, options),
        contents: output.document,
    })?;
    for sheet in &output.stylesheets {
        let path = output_path(&sheet.path, options);
        if !written.insert(path.clone()) {
            continue;
        }
        info!("写入样式表: {}", path.display());
        write_artifact(&Artifact {
            path,
            contents: sheet.contents.clone(),
        })?;
    }
    Ok(())
}

/// 返回缺失的图片数
fn collect_document(file: &Path, options: &WebpOptions) -> WebpResult<usize> {
    let document = Document::read(file)?;
    let collection = collect(&document, options)?;

    for artifact in &collection.artifacts {
        if options.output_base.is_some() {
            write_artifact(artifact)?;
        } else {
            print_info_message(&artifact.path.display().to_string());
        }
    }
    Ok(collection.missing.len())
}

/// 逐个处理文档，返回失败的文档数
///
/// 单个文档的错误只影响它自己；只有配置错误会中止整个批次。
fn run(cli: &Cli) -> WebpResult<usize> {
    let mut options = load_options(cli.options.config.as_deref())?;
    cli.options.apply(&mut options);
    options.validate()?;

    let (files, is_replace) = match &cli.command {
        Command::Replace { files } => (files, true),
        Command::Collect { files } => (files, false),
    };

    let mut failed = 0;
    let mut missing = 0;
    let mut written = HashSet::new();
    for file in files {
        let result = if is_replace {
            replace_document(file, &options, &mut written)
        } else {
            collect_document(file, &options).map(|count| missing += count)
        };
        match result {
            Ok(()) => {}
            Err(e) if e.is_config_error() => return Err(e),
            Err(e) => {
                print_error_message(&format!("Error: {}", e));
                failed += 1;
            }
        }
    }

    if missing > 0 {
        warn!("{} 个引用的图片不存在", missing);
    }
    Ok(failed)
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.options.silent);

    match run(&cli) {
        Ok(0) => {}
        Ok(_) => process::exit(1),
        Err(e) => {
            print_error_message(&format!("Error: {}", e));
            process::exit(1);
        }
    }
}
