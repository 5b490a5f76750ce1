//! 交互式向导的命令解析

use crate::generator::pipeline::Stage;

/// 向导中的一条用户命令，序号均已转换为从0开始
#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    /// `topic <主题> [@ 目的地]`
    Topic {
        topic: String,
        destination: Option<String>,
    },
    /// `gen`：生成当前阶段的候选
    Generate,
    /// `gen <n>`：生成第n个章节
    GenerateSection(usize),
    /// `gen all`：依次生成所有未完成的章节
    GenerateAll,
    /// `pick <n>`
    Pick(usize),
    /// `set <值>`：手动填写当前阶段
    Set(String),
    /// `add <标题>[; 子标题, 子标题]`：追加自定义章节
    AddSection {
        heading: String,
        subheadings: Vec<String>,
    },
    Next,
    Back(Stage),
    Show,
    Score,
    Publish {
        category: String,
        destination: String,
    },
    Discard,
    Help,
    Quit,
}

pub const HELP: &str = "\
topic <text> [@ destination]   set the post topic (stage 1)
gen                            generate candidates for the current stage
gen <n> | gen all              generate section n / every unfinished section
pick <n>                       accept candidate n
set <value>                    enter the current stage's value by hand
add <heading>[; sub, sub]      append a custom outline section
next | back <stage>            move forward / return to an earlier stage
show | score                   print the draft / run the SEO check
publish <category> <dest>      save the post (review stage)
discard | quit";

fn ordinal(value: &str) -> Result<usize, String> {
    match value.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("invalid number: {}", value.trim())),
    }
}

impl std::str::FromStr for WizardCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match (verb.to_lowercase().as_str(), rest) {
            ("topic", "") => return Err("usage: topic <text> [@ destination]".to_string()),
            ("topic", rest) => {
                let (topic, destination) = match rest.split_once('@') {
                    Some((topic, destination)) => {
                        (topic.trim(), Some(destination.trim().to_string()))
                    }
                    None => (rest, None),
                };
                WizardCommand::Topic {
                    topic: topic.to_string(),
                    destination: destination.filter(|d| !d.is_empty()),
                }
            }
            ("gen" | "generate" | "regen", "") => WizardCommand::Generate,
            ("gen" | "generate" | "regen", "all") => WizardCommand::GenerateAll,
            ("gen" | "generate" | "regen", n) => WizardCommand::GenerateSection(ordinal(n)?),
            ("pick", n) => WizardCommand::Pick(ordinal(n)?),
            ("set", "") => return Err("usage: set <value>".to_string()),
            ("set", value) => WizardCommand::Set(value.to_string()),
            ("add", "") => return Err("usage: add <heading>[; sub, sub]".to_string()),
            ("add", rest) => {
                let (heading, subheadings) = rest.split_once(';').unwrap_or((rest, ""));
                WizardCommand::AddSection {
                    heading: heading.trim().to_string(),
                    subheadings: split_list(subheadings),
                }
            }
            ("next", "") => WizardCommand::Next,
            ("back", stage) => WizardCommand::Back(
                Stage::from_key(stage).ok_or_else(|| format!("unknown stage: {}", stage))?,
            ),
            ("show" | "status", "") => WizardCommand::Show,
            ("score" | "seo", "") => WizardCommand::Score,
            ("publish", rest) => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(category), Some(destination), None) => WizardCommand::Publish {
                        category: category.to_string(),
                        destination: destination.to_string(),
                    },
                    _ => return Err("usage: publish <category> <destination>".to_string()),
                }
            }
            ("discard", "") => WizardCommand::Discard,
            ("help" | "?", _) => WizardCommand::Help,
            ("quit" | "exit" | "q", "") => WizardCommand::Quit,
            ("", _) => return Err("empty command".to_string()),
            _ => return Err(format!("unknown command: {} (type `help`)", line)),
        };
        Ok(command)
    }
}

/// 逗号分隔的列表，去掉空项
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
