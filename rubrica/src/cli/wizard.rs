//! Terminal front end for [`Workflow`].
//!
//! Reads one command per line and prints the current step after every
//! action. The wizard never touches the network itself: generation goes
//! through a [`RubricGenerator`] and usage events through an optional
//! [`ProxyClient`].

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::client::ProxyClient;
use crate::error::{Result, RubricaError};
use crate::llm::prompts::Direction;
use crate::models::{
    local_timestamp, CharCount, CriterionField, CriterionId, LevelCount, NotificationEvent,
    UserProfile,
};
use crate::workflow::{render_rubric, RubricExport, RubricGenerator, Step, Workflow};

const LAST_CRITERION_MESSAGE: &str = "最後の観点は削除できません";

/// Who to report usage events for, and where to send them.
#[derive(Debug, Clone)]
pub struct WizardNotify {
    pub client: ProxyClient,
    pub profile: UserProfile,
}

pub struct Wizard<'a, R, W> {
    input: Lines<R>,
    output: W,
    generator: &'a dyn RubricGenerator,
    notify: Option<WizardNotify>,
    out_dir: PathBuf,
    workflow: Workflow,
    notifications: JoinSet<()>,
}

/// Outcome of one screen: stay in the loop or leave the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

impl<'a, R, W> Wizard<'a, R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        input: R,
        output: W,
        generator: &'a dyn RubricGenerator,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.lines(),
            output,
            generator,
            notify: None,
            out_dir: out_dir.into(),
            workflow: Workflow::new(),
            notifications: JoinSet::new(),
        }
    }

    pub fn with_notify(mut self, notify: WizardNotify) -> Self {
        self.notify = Some(notify);
        self
    }

    /// Run until the user quits or input ends. Pending notifications are
    /// awaited before returning the final workflow state.
    pub async fn run(mut self) -> Result<Workflow> {
        let first_use = self
            .notify
            .as_ref()
            .map(|notify| NotificationEvent::first_use(&notify.profile, local_timestamp()));
        if let Some(event) = first_use {
            self.send_notification(event);
        }

        loop {
            let flow = match self.workflow.step() {
                Step::BasicInfoEntry => self.basic_info_screen().await?,
                Step::CriteriaEntry => self.criteria_screen().await?,
                Step::RubricReview => self.review_screen().await?,
            };
            if flow == Flow::Quit {
                break;
            }
        }

        while self.notifications.join_next().await.is_some() {}
        Ok(self.workflow)
    }

    async fn basic_info_screen(&mut self) -> Result<Flow> {
        self.say("\n== ステップ1: 基本情報 ==").await?;
        let current = self.workflow.basic_info().clone();

        let Some(subject) = self.ask_or("科目", &current.subject).await? else {
            return Ok(Flow::Quit);
        };
        let Some(title) = self.ask_or("評価項目", &current.title).await? else {
            return Ok(Flow::Quit);
        };
        let Some(grade) = self.ask_or("学年", &current.grade).await? else {
            return Ok(Flow::Quit);
        };
        let Some(levels) = self
            .ask_or("評価段階 (3/4/5)", &current.levels.to_string())
            .await?
        else {
            return Ok(Flow::Quit);
        };
        let Some(char_count) = self
            .ask_or("文字数 (30/50/80/120)", current.char_count.as_str())
            .await?
        else {
            return Ok(Flow::Quit);
        };

        let levels = match levels.parse::<LevelCount>() {
            Ok(levels) => levels,
            Err(e) => {
                self.say(&format!("⚠ {e}")).await?;
                current.levels
            }
        };
        let char_count = match char_count.parse::<CharCount>() {
            Ok(char_count) => char_count,
            Err(e) => {
                self.say(&format!("⚠ {e}")).await?;
                current.char_count
            }
        };

        let info = self.workflow.edit_basic_info()?;
        info.subject = subject;
        info.title = title;
        info.grade = grade;
        info.levels = levels;
        info.char_count = char_count;

        if let Err(e) = self.workflow.proceed_to_criteria() {
            self.report(&e).await?;
        }
        Ok(Flow::Continue)
    }

    async fn criteria_screen(&mut self) -> Result<Flow> {
        self.say("\n== ステップ2: 評価観点と評価規準 ==").await?;
        let middle = self.workflow.basic_info().levels.middle();
        self.say(&format!("評価規準はレベル{middle}相当の内容を入力してください"))
            .await?;
        let listing = self
            .workflow
            .criteria()
            .iter()
            .map(|c| format!("  [{}] {} / {}", c.id, c.aspect, c.standard))
            .collect::<Vec<_>>()
            .join("\n");
        self.say(&listing).await?;

        let Some(command) = self
            .ask("a=追加 e <番号>=編集 d <番号>=削除 g=生成 h=基本情報へ q=終了")
            .await?
        else {
            return Ok(Flow::Quit);
        };

        let (verb, arg) = split_command(&command);
        match verb {
            "a" => {
                let id = self.workflow.add_criterion()?;
                return self.edit_criterion(id).await;
            }
            "e" => match parse_id(arg) {
                Some(id) => return self.edit_criterion(id).await,
                None => self.say("⚠ 番号を指定してください").await?,
            },
            "d" => match parse_id(arg) {
                Some(id) => {
                    if !self.workflow.remove_criterion(id)? {
                        self.say(&format!("⚠ {LAST_CRITERION_MESSAGE}")).await?;
                    }
                }
                None => self.say("⚠ 番号を指定してください").await?,
            },
            "g" => {
                self.say("ルーブリックを生成中...").await?;
                let generator = self.generator;
                let outcome = self.workflow.generate_with(generator).await.map(|_| ());
                match outcome {
                    Ok(()) => self.notify_generated(),
                    Err(e) => self.report(&e).await?,
                }
            }
            "h" => self.workflow.home()?,
            "q" => return Ok(Flow::Quit),
            _ => self.say("⚠ 不明なコマンドです").await?,
        }
        Ok(Flow::Continue)
    }

    async fn edit_criterion(&mut self, id: CriterionId) -> Result<Flow> {
        let Some(current) = self.workflow.criteria().iter().find(|c| c.id == id).cloned() else {
            self.say(&format!("⚠ 観点 {id} は存在しません")).await?;
            return Ok(Flow::Continue);
        };

        let Some(aspect) = self.ask_or("観点名", &current.aspect).await? else {
            return Ok(Flow::Quit);
        };
        let Some(standard) = self.ask_or("評価規準", &current.standard).await? else {
            return Ok(Flow::Quit);
        };

        self.workflow.update_criterion(id, CriterionField::Aspect, aspect)?;
        self.workflow.update_criterion(id, CriterionField::Standard, standard)?;
        Ok(Flow::Continue)
    }

    async fn review_screen(&mut self) -> Result<Flow> {
        self.say("\n== ステップ3: ルーブリックの確認・編集 ==").await?;
        if let Some(rubric) = self.workflow.rubric() {
            let text = render_rubric(self.workflow.basic_info(), rubric);
            self.say(&text).await?;
        }

        let Some(command) = self
            .ask("+=難しく -=易しく c=修正指示 s=保存 b=編集に戻る n=新規作成 h=ホーム q=終了")
            .await?
        else {
            return Ok(Flow::Quit);
        };

        let generator = self.generator;
        match split_command(&command).0 {
            "+" | "-" => {
                let direction = if command.starts_with('+') {
                    Direction::Harder
                } else {
                    Direction::Easier
                };
                self.say("難易度を調整中...").await?;
                if let Some(e) = self.workflow.adjust_with(direction, generator).await.err() {
                    self.report(&e).await?;
                }
            }
            "c" => {
                let Some(instruction) = self.ask("修正指示").await? else {
                    return Ok(Flow::Quit);
                };
                self.workflow.set_custom_instruction(instruction)?;
                self.say("修正中...").await?;
                let outcome = self.workflow.apply_custom_instruction_with(generator).await;
                if let Some(e) = outcome.err() {
                    self.report(&e).await?;
                }
            }
            "s" => match self.save().await {
                Ok(path) => self.say(&format!("保存しました: {}", path.display())).await?,
                Err(e) => self.say(&format!("⚠ 保存に失敗しました: {e}")).await?,
            },
            "b" => self.workflow.back_to_edit()?,
            "n" => self.workflow.start_new()?,
            "h" => self.workflow.home()?,
            "q" => return Ok(Flow::Quit),
            _ => self.say("⚠ 不明なコマンドです").await?,
        }
        Ok(Flow::Continue)
    }

    async fn save(&self) -> Result<PathBuf> {
        let export = self.workflow.export()?;
        save_export(&export, &self.out_dir).await
    }

    fn notify_generated(&mut self) {
        let event = match (&self.notify, self.workflow.rubric()) {
            (Some(notify), Some(rubric)) => NotificationEvent::rubric_generated(
                &notify.profile,
                self.workflow.basic_info(),
                rubric,
                local_timestamp(),
            ),
            _ => return,
        };
        self.send_notification(event);
    }

    /// Fire and forget; the wizard never waits on telemetry mid-session.
    fn send_notification(&mut self, event: NotificationEvent) {
        let Some(notify) = &self.notify else {
            return;
        };
        let client = notify.client.clone();
        debug!(kind = ?event.event_kind(), "Queueing usage notification");
        self.notifications.spawn(async move {
            client.notify(&event).await;
        });
    }

    /// Print the workflow's error banner, or the error itself when the
    /// failure happened before the workflow recorded one.
    async fn report(&mut self, error: &RubricaError) -> Result<()> {
        let message = self
            .workflow
            .error_message()
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        self.say(&format!("⚠ {message}")).await
    }

    async fn say(&mut self, line: &str) -> Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    /// Prompt for one line. `None` once input is exhausted.
    async fn ask(&mut self, label: &str) -> Result<Option<String>> {
        self.output.write_all(format!("{label}> ").as_bytes()).await?;
        self.output.flush().await?;
        Ok(self.input.next_line().await?.map(|line| line.trim().to_string()))
    }

    /// Like [`Self::ask`], but an empty answer keeps `current`.
    async fn ask_or(&mut self, label: &str, current: &str) -> Result<Option<String>> {
        let label = if current.is_empty() {
            label.to_string()
        } else {
            format!("{label} [{current}]")
        };
        Ok(self.ask(&label).await?.map(|answer| {
            if answer.is_empty() {
                current.to_string()
            } else {
                answer
            }
        }))
    }
}

fn split_command(command: &str) -> (&str, &str) {
    let command = command.trim();
    match command.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (command, ""),
    }
}

fn parse_id(arg: &str) -> Option<CriterionId> {
    arg.parse().ok()
}

/// Write the export into `dir`, replacing path separators in the file name.
pub async fn save_export(export: &RubricExport, dir: &Path) -> Result<PathBuf> {
    let file_name = export.file_name.replace(['/', '\\'], "_");
    let path = dir.join(file_name);

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, &export.contents).await?;
    info!("Rubric exported to {}", path.display());

    Ok(path)
}
