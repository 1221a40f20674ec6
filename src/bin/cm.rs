extern crate calmonth as lib;

use flexi_logger::{FileSpec, Logger};
use lib::dispatch::Presenter;
use lib::error::{Error, ErrorKind};
use lib::events::Trigger;
use lib::nav::Direction;
use lib::render::{Activation, ActionRef, InstanceId, RenderDescriptor};
use lib::store::FileStore;
use lib::widget::Widget;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "cm",
    author = "Julian Bigge <j.reedts@gmail.com>",
    about = "calmonth - Month image widget host."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,

    #[structopt(subcommand)]
    pub cmd: Cmd,
}

#[derive(Debug, StructOpt)]
pub enum Cmd {
    #[structopt(about = "redraw all widgets")]
    Refresh,
    #[structopt(about = "show the previous month if it has an image")]
    Prev {
        #[structopt(short = "i", long = "instance", default_value = "1")]
        instance: u32,
    },
    #[structopt(about = "show the next month if it has an image")]
    Next {
        #[structopt(short = "i", long = "instance", default_value = "1")]
        instance: u32,
    },
    #[structopt(about = "act on a control id such as 'nav:next:1'")]
    Tap { action: ActionRef },
}

/// Binds each control to the command line that triggers it.
struct TapCommand;

impl Activation for TapCommand {
    type Token = String;

    fn pending(&mut self, action: &ActionRef) -> String {
        format!("cm tap {}", action)
    }
}

/// Writes widgets as text. An image that cannot be opened is logged and left
/// out, the label and controls are still drawn.
struct TextPresenter<W: Write, A: Activation<Token = String>> {
    out: W,
    activation: A,
}

impl<W: Write, A: Activation<Token = String>> TextPresenter<W, A> {
    fn new(out: W, activation: A) -> Self {
        TextPresenter { out, activation }
    }
}

impl<W: Write, A: Activation<Token = String>> Presenter for TextPresenter<W, A> {
    fn present(&mut self, instance: InstanceId, descriptor: &RenderDescriptor) -> lib::error::Result<()> {
        let image = descriptor
            .image_path
            .as_deref()
            .filter(|path| match File::open(path) {
                Ok(_) => true,
                Err(err) => {
                    log::warn!("Widget {}: cannot open image '{}': {}", instance, path, err);
                    false
                }
            });

        let prev = self.activation.pending(&descriptor.controls.prev);
        let next = self.activation.pending(&descriptor.controls.next);
        let root = self.activation.pending(&descriptor.root_action);

        writeln!(
            self.out,
            "[{}] {}  image: {}  <{}>  <{}>  root: <{}>",
            instance,
            descriptor.label,
            image.unwrap_or("-"),
            prev,
            next,
            root,
        )
        .map_err(|err| Error::new(ErrorKind::Presentation, &err.to_string()))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    let _logger = logger.start()?;

    std::panic::set_hook(Box::new(|info| {
        eprintln!("calmonth ran into a fatal error!");
        eprintln!("Consider filing an issue with a log file and the backtrace below");

        eprintln!("{}", info);
        eprintln!("{:?}", backtrace::Backtrace::new());
    }));

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    let trigger = match args.cmd {
        Cmd::Refresh => Trigger::Refresh,
        Cmd::Prev { instance } => Trigger::Navigate {
            direction: Direction::Prev,
            instance: InstanceId(instance),
        },
        Cmd::Next { instance } => Trigger::Navigate {
            direction: Direction::Next,
            instance: InstanceId(instance),
        },
        Cmd::Tap { action } => match Trigger::from_action(&action) {
            Some(trigger) => trigger,
            None => {
                println!("{}: nothing to do for the widget", action);
                return Ok(());
            }
        },
    };

    let mut store = FileStore::new(&config.store);
    let widget = Widget::from_config(&config);

    let mut presenter = TextPresenter::new(io::stdout(), TapCommand);
    let outcome = widget.handle(trigger, &mut store, &config.instances, &mut presenter);

    if let Some(transition) = outcome.transition {
        if !transition.committed {
            log::info!("No image for {}, staying on {}", transition.to, transition.from);
        }
    }

    if !outcome.report.is_complete() {
        for (instance, err) in &outcome.report.failed {
            eprintln!("widget {}: {}", instance, err);
        }
    }

    Ok(())
}
