// Command line flags

use clap::Parser;

#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "localdisk", version, about = "Inventory local disks and drive their fault LEDs")]
pub struct Args {
    /// list all local disks
    #[arg(long)]
    pub list: bool,

    /// show a specific disk matching given /dev name
    #[arg(long, value_name = "DEVICE")]
    pub show: Option<String>,

    /// activate fail LED on a given device
    #[arg(long = "fail-led-on", value_name = "DEVICE")]
    pub fail_led_on: Option<String>,

    /// de-activate fail LED on a given device
    #[arg(long = "fail-led-off", value_name = "DEVICE")]
    pub fail_led_off: Option<String>,
}

/// What a single invocation does.
#[derive(Debug, PartialEq)]
pub enum Action {
    List,
    Show(String),
    FailLed {
        on: Option<String>,
        off: Option<String>,
    },
    Nothing,
}

impl Args {
    /// An empty device argument counts as not given.
    pub fn action(self) -> Action {
        let given = |v: Option<String>| v.filter(|s| !s.is_empty());
        if self.list {
            return Action::List;
        }
        if let Some(dev) = given(self.show) {
            return Action::Show(dev);
        }
        let (on, off) = (given(self.fail_led_on), given(self.fail_led_off));
        if on.is_some() || off.is_some() {
            return Action::FailLed { on, off };
        }
        Action::Nothing
    }
}

/// Accept single-dash long flags (`-list`, `-show=/dev/sda`) by rewriting them to `--` form.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = Vec::new();
    let mut passthrough = false;
    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || passthrough {
            out.push(arg);
            continue;
        }
        if arg == "--" {
            passthrough = true;
            out.push(arg);
        } else if arg.len() > 2 && arg.starts_with('-') && !arg.starts_with("--") {
            out.push(format!("-{arg}"));
        } else {
            out.push(arg);
        }
    }
    out
}
