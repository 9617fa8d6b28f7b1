// src/commands/render.rs
use crate::services::catalog::ANALYSIS_TOOLS;
use crate::services::dataset::{DatasetDescriptor, FileKind};
use crate::services::session::{ChatTurn, Role, Session, SessionEvent};

pub fn turn(turn: &ChatTurn) -> String {
    match turn.role {
        Role::User => format!("you> {}", turn.content),
        Role::Assistant => format!("assistant> {}", turn.content),
    }
}

pub fn banner(message: &str) -> String {
    format!("! {message}")
}

/// Lines to print after `event` has been applied to `session`.
pub fn event(event: &SessionEvent, session: &Session) -> Vec<String> {
    match event {
        SessionEvent::UploadProgress(_) => session
            .uploader()
            .filter(|u| u.is_uploading)
            .map(|u| vec![format!("uploading... {}%", u.progress)])
            .unwrap_or_default(),
        SessionEvent::UploadSucceeded(dataset) => vec![format!(
            "dataset ready: {} ({} preview rows), /dataset to inspect",
            dataset.filename,
            dataset.preview_rows.len()
        )],
        SessionEvent::UploadFailed(_) | SessionEvent::ReplyFailed(_) => session
            .error()
            .map(|message| vec![banner(message)])
            .unwrap_or_default(),
        SessionEvent::ReplyReceived(_) => {
            session.transcript().last().map(turn).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

pub fn dataset(dataset: Option<&DatasetDescriptor>) -> String {
    let Some(dataset) = dataset else {
        return "no dataset loaded, use /upload <path>".to_string();
    };

    let mut out = format!(
        "{} [{}]\n\n{}",
        dataset.filename,
        dataset.dataset_id,
        dataset.render_preview()
    );
    if let Some(metadata) = dataset.render_metadata() {
        out.push_str("\n\n");
        out.push_str(&metadata);
    }
    out
}

pub fn selected_file(path: &std::path::Path) -> String {
    format!(
        "selected {} ({})",
        path.display(),
        FileKind::from_path(path).label()
    )
}

pub fn tools() -> String {
    ANALYSIS_TOOLS
        .iter()
        .enumerate()
        .map(|(i, tool)| format!("{}. {} - {}", i + 1, tool.name, tool.description))
        .collect::<Vec<_>>()
        .join("\n")
}

pub const HELP: &str = "\
/upload <path>...  upload a data file (.sav, .csv, .xlsx, .xls)
/cancel            close the uploader
/dataset           show the current dataset preview
/tools [n]         list analyses, or ask for analysis n
/help              show this help
/quit              leave
anything else is sent to the assistant";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;

    #[test]
    fn renders_turns_by_role() {
        assert_eq!(turn(&ChatTurn::user("hi")), "you> hi");
        assert_eq!(turn(&ChatTurn::assistant("ok")), "assistant> ok");
    }

    #[test]
    fn failed_reply_prints_banner() {
        let mut session = Session::default();
        let failed = SessionEvent::ReplyFailed(ChatError::Analysis { status: 500 });
        session.apply(failed.clone());
        assert_eq!(event(&failed, &session), vec!["! Analysis failed".to_string()]);
    }

    #[test]
    fn lists_tools_from_one() {
        let listing = tools();
        assert!(listing.starts_with("1. Gabor Granger"));
        assert_eq!(listing.lines().count(), 4);
    }

    #[test]
    fn dataset_without_upload() {
        assert!(dataset(None).contains("/upload"));
    }
}
