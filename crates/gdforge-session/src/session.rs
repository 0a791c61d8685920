//! The editor session state machine

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use gdforge_history::HistoryLog;
use gdforge_project::{store, FileId, ProjectSnapshot, ScriptFile};
use gdforge_providers::{
    ChatContext, ChatMessage, CodeRequest, ErrorReport, GenerationSettings, ImageRequest,
};

use crate::error::SessionError;
use crate::request::{Applied, RequestId, RequestTicket, ToolKind, ToolResponse};

/// A generated image the session is keeping for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Where the image lives, as a displayable URL
    pub url: String,
    /// The prompt that produced it
    pub prompt: String,
    /// When the result arrived
    pub created_at: DateTime<Utc>,
}

/// Book-keeping for one in-flight request, kept session-side so a
/// response can never smuggle in a different target than was asked for.
#[derive(Debug, Clone)]
struct PendingRequest {
    id: RequestId,
    target: Option<FileId>,
    prompt: String,
    issued_at: DateTime<Utc>,
}

/// All state of one running editor.
///
/// Mutating operations go through the pure transformations in
/// `gdforge_project::store` and push exactly one history entry per
/// successful change; refused operations change nothing at all. The
/// snapshot held here always equals the history log's current entry.
#[derive(Debug)]
pub struct EditorSession {
    snapshot: ProjectSnapshot,
    history: HistoryLog,
    active: FileId,
    transcript: Vec<ChatMessage>,
    images: Vec<GeneratedImage>,
    explanation: Option<String>,
    analysis: Option<String>,
    settings: GenerationSettings,
    pending: BTreeMap<ToolKind, PendingRequest>,
}

impl EditorSession {
    /// Opens a fresh session seeded with the starter project.
    pub fn new(settings: GenerationSettings) -> Self {
        let snapshot = ProjectSnapshot::starter();
        let active = snapshot.files()[0].id;
        let history = HistoryLog::new(snapshot.clone());
        info!(file_id = %active, "Opened a new editor session");

        EditorSession {
            snapshot,
            history,
            active,
            transcript: Vec::new(),
            images: Vec::new(),
            explanation: None,
            analysis: None,
            settings,
            pending: BTreeMap::new(),
        }
    }

    /// The currently visible project state.
    pub fn snapshot(&self) -> &ProjectSnapshot {
        &self.snapshot
    }

    /// The undo history behind the visible state.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Id of the file open in the editor pane.
    pub fn active_id(&self) -> FileId {
        self.active
    }

    /// The file open in the editor pane.
    pub fn active_file(&self) -> &ScriptFile {
        match self.snapshot.get(self.active) {
            Some(file) => file,
            // unreachable while the repoint invariant holds
            None => &self.snapshot.files()[0],
        }
    }

    /// Chat transcript, oldest first.
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Generated images, newest first.
    pub fn images(&self) -> &[GeneratedImage] {
        &self.images
    }

    /// Explanation attached to the most recent generated code, if any.
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// The most recent error analysis, if any.
    pub fn analysis(&self) -> Option<&str> {
        self.analysis.as_deref()
    }

    /// Current generation settings.
    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Mutable access for the settings panel. Settings are not project
    /// state and never enter the undo history.
    pub fn settings_mut(&mut self) -> &mut GenerationSettings {
        &mut self.settings
    }

    /// Whether a request for the given tool is still in flight.
    pub fn is_busy(&self, kind: ToolKind) -> bool {
        self.pending.contains_key(&kind)
    }

    /// Tools with a request in flight, in stable order.
    pub fn busy_kinds(&self) -> impl Iterator<Item = ToolKind> + '_ {
        self.pending.keys().copied()
    }

    /// Creates a file and opens it in the editor.
    pub fn create_file(&mut self, name: &str) -> Result<FileId, SessionError> {
        let next = store::create_file(&self.snapshot, name)?;
        let id = next.files()[next.len() - 1].id;
        self.apply(next);
        self.active = id;
        Ok(id)
    }

    /// Replaces the content of one file, recording a history entry.
    pub fn update_file_content(
        &mut self,
        id: FileId,
        content: impl Into<String>,
    ) -> Result<(), SessionError> {
        if !self.snapshot.contains(id) {
            return Err(SessionError::UnknownFile(id));
        }
        let next = store::update_file_content(&self.snapshot, id, content);
        self.apply(next);
        Ok(())
    }

    /// Removes a file; the editor falls back to the first file if the
    /// open one went away.
    pub fn delete_file(&mut self, id: FileId) -> Result<(), SessionError> {
        let next = store::delete_file(&self.snapshot, id)?;
        self.apply(next);
        Ok(())
    }

    /// Opens another file in the editor. Selection is a view concern and
    /// pushes nothing onto the history.
    pub fn select_file(&mut self, id: FileId) -> Result<(), SessionError> {
        if !self.snapshot.contains(id) {
            return Err(SessionError::UnknownFile(id));
        }
        self.active = id;
        Ok(())
    }

    /// Steps the visible state back one history entry.
    ///
    /// Returns false when already at the seed; nothing changes then.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                self.snapshot = snapshot.clone();
                self.repoint_active();
                true
            }
            None => false,
        }
    }

    /// Steps the visible state forward one history entry.
    ///
    /// Returns false when there is nothing to redo; nothing changes then.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                self.snapshot = snapshot.clone();
                self.repoint_active();
                true
            }
            None => false,
        }
    }

    /// Starts a code generation request for the open file.
    ///
    /// Returns the correlation ticket plus the request the shell should
    /// send. Refused while a code request is already running.
    pub fn begin_code_request(
        &mut self,
        prompt: &str,
    ) -> Result<(RequestTicket, CodeRequest), SessionError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        self.ensure_idle(ToolKind::Code)?;

        let ticket = self.admit(ToolKind::Code, Some(self.active), prompt);
        let request = CodeRequest {
            prompt: prompt.to_string(),
            snapshot: self.snapshot.clone(),
            target: self.active,
            settings: self.settings.clone(),
        };
        Ok((ticket, request))
    }

    /// Starts a chat request and appends the user's message to the
    /// transcript. The context carries the transcript as it stood before
    /// this message.
    pub fn begin_chat_request(
        &mut self,
        message: &str,
    ) -> Result<(RequestTicket, ChatContext), SessionError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        self.ensure_idle(ToolKind::Chat)?;

        let context = ChatContext {
            transcript: self.transcript.clone(),
            message: message.to_string(),
            snapshot: self.snapshot.clone(),
        };
        let ticket = self.admit(ToolKind::Chat, None, message);
        self.transcript.push(ChatMessage::user(message));
        Ok((ticket, context))
    }

    /// Starts an image generation request.
    pub fn begin_image_request(
        &mut self,
        prompt: &str,
        reference_image: Option<Vec<u8>>,
    ) -> Result<(RequestTicket, ImageRequest), SessionError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        self.ensure_idle(ToolKind::Image)?;

        let ticket = self.admit(ToolKind::Image, None, prompt);
        let request = ImageRequest {
            prompt: prompt.to_string(),
            reference_image,
        };
        Ok((ticket, request))
    }

    /// Starts an error analysis request against the open file.
    ///
    /// Empty error text is allowed; the model is then asked to review the
    /// script for likely problems instead.
    pub fn begin_analysis_request(
        &mut self,
        error_text: &str,
    ) -> Result<(RequestTicket, ErrorReport), SessionError> {
        self.ensure_idle(ToolKind::Analysis)?;

        let file = self.active_file();
        let report = ErrorReport {
            error_text: error_text.trim().to_string(),
            file_name: file.name.clone(),
            file_content: file.content.clone(),
        };
        let ticket = self.admit(ToolKind::Analysis, None, error_text.trim());
        Ok((ticket, report))
    }

    /// Applies a finished request to the session.
    ///
    /// The ticket must match what the session is still waiting for;
    /// anything else is reported (and dropped) as stale. Failed results
    /// clear the pending slot and change nothing else.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        response: ToolResponse,
    ) -> Result<Applied, SessionError> {
        if response.kind() != ticket.kind {
            warn!(kind = %ticket.kind, "Response kind does not match its ticket");
            return Err(SessionError::StaleResponse);
        }

        let pending = match self.pending.remove(&ticket.kind) {
            Some(p) if p.id == ticket.id => p,
            Some(other) => {
                // a newer request owns this slot now; leave it waiting
                self.pending.insert(ticket.kind, other);
                warn!(kind = %ticket.kind, request_id = %ticket.id, "Dropping stale response");
                return Err(SessionError::StaleResponse);
            }
            None => {
                warn!(kind = %ticket.kind, request_id = %ticket.id, "Dropping response with no pending request");
                return Err(SessionError::StaleResponse);
            }
        };
        debug!(
            kind = %ticket.kind,
            request_id = %ticket.id,
            elapsed_ms = (Utc::now() - pending.issued_at).num_milliseconds(),
            "Request finished"
        );

        match response {
            ToolResponse::Code(result) => {
                let generated = result?;
                let Some(target) = pending.target else {
                    return Err(SessionError::TargetMissing);
                };
                let Some(file) = self.snapshot.get(target) else {
                    warn!(file_id = %target, "Target file deleted before generation finished");
                    return Err(SessionError::TargetMissing);
                };
                let file_name = file.name.clone();

                let next = store::update_file_content(&self.snapshot, target, generated.code);
                self.apply(next);
                self.explanation = Some(generated.explanation);
                Ok(Applied::Code { file_name })
            }
            ToolResponse::Chat(result) => {
                let reply = result?;
                self.transcript.push(ChatMessage::assistant(reply));
                Ok(Applied::Chat)
            }
            ToolResponse::Image(result) => {
                let url = result?;
                self.images.insert(
                    0,
                    GeneratedImage {
                        url: url.clone(),
                        prompt: pending.prompt,
                        created_at: Utc::now(),
                    },
                );
                Ok(Applied::Image { url })
            }
            ToolResponse::Analysis(result) => {
                let text = result?;
                self.analysis = Some(text);
                Ok(Applied::Analysis)
            }
        }
    }

    /// Records a successful transformation: one history entry, then sync
    /// the visible snapshot and the open-file pointer.
    fn apply(&mut self, next: ProjectSnapshot) {
        self.history.push(next.clone());
        self.snapshot = next;
        self.repoint_active();
    }

    fn repoint_active(&mut self) {
        if !self.snapshot.contains(self.active) {
            self.active = self.snapshot.files()[0].id;
            debug!(file_id = %self.active, "Open file went away; falling back to first file");
        }
    }

    fn ensure_idle(&self, kind: ToolKind) -> Result<(), SessionError> {
        if self.pending.contains_key(&kind) {
            return Err(SessionError::RequestInFlight(kind));
        }
        Ok(())
    }

    fn admit(&mut self, kind: ToolKind, target: Option<FileId>, prompt: &str) -> RequestTicket {
        let ticket = RequestTicket::new(kind);
        debug!(kind = %kind, request_id = %ticket.id, "Starting request");
        self.pending.insert(
            kind,
            PendingRequest {
                id: ticket.id,
                target,
                prompt: prompt.to_string(),
                issued_at: Utc::now(),
            },
        );
        ticket
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// One scripted user action against the session.
    #[derive(Debug, Clone)]
    enum SessionOp {
        Create(String),
        UpdateActive(String),
        Delete(usize),
        Select(usize),
        Undo,
        Redo,
    }

    /// Strategy for file names, occasionally blank to exercise refusals
    fn name_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => r"[a-z]{1,8}\.(gd|json)",
            1 => Just(String::new()),
        ]
    }

    /// Strategy for action sequences
    fn ops_strategy() -> impl Strategy<Value = Vec<SessionOp>> {
        prop::collection::vec(
            prop_oneof![
                name_strategy().prop_map(SessionOp::Create),
                r"[ -~]{0,30}".prop_map(SessionOp::UpdateActive),
                (0usize..8).prop_map(SessionOp::Delete),
                (0usize..8).prop_map(SessionOp::Select),
                Just(SessionOp::Undo),
                Just(SessionOp::Redo),
            ],
            0..40,
        )
    }

    proptest! {
        /// *For any* sequence of edits, deletions, selections, undos, and
        /// redos: the visible snapshot equals the history's current entry,
        /// the open file always exists, the project is never empty, and
        /// every successful mutation costs exactly one history entry.
        #[test]
        fn prop_session_invariants_hold(ops in ops_strategy()) {
            let mut session = EditorSession::new(GenerationSettings::default());

            for op in ops {
                let len_before = session.history().len();
                let index_before = session.history().index();

                let mutated = match op {
                    SessionOp::Create(name) => session.create_file(&name).is_ok(),
                    SessionOp::UpdateActive(content) => {
                        let id = session.active_id();
                        session.update_file_content(id, content).is_ok()
                    }
                    SessionOp::Delete(pick) => {
                        let files = session.snapshot().files();
                        let id = files[pick % files.len()].id;
                        session.delete_file(id).is_ok()
                    }
                    SessionOp::Select(pick) => {
                        let files = session.snapshot().files();
                        let id = files[pick % files.len()].id;
                        session.select_file(id).unwrap();
                        false
                    }
                    SessionOp::Undo => {
                        let moved = session.undo();
                        prop_assert_eq!(moved, index_before > 0);
                        false
                    }
                    SessionOp::Redo => {
                        let moved = session.redo();
                        prop_assert_eq!(moved, index_before + 1 < len_before);
                        false
                    }
                };

                if mutated {
                    // one entry past the cursor position at push time
                    prop_assert_eq!(session.history().index(), index_before + 1);
                    prop_assert_eq!(session.history().len(), index_before + 2);
                }

                prop_assert!(!session.snapshot().is_empty());
                prop_assert!(session.snapshot().contains(session.active_id()));
                prop_assert_eq!(session.snapshot(), session.history().current());
                prop_assert!(session.history().index() < session.history().len());
            }
        }
    }
}
