use crate::config::{BackupRetention, ShellSettings, UnknownCommandPolicy};
use crate::error::{ErrorKind, Result};
use crate::shell::context::ShellContext;
use crate::shell::prompter::ScriptedPrompter;
use crate::shell::run_command_line;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

struct Session {
    _dir: TempDir,
    root: PathBuf,
    ctx: ShellContext,
    asked: Arc<Mutex<Vec<String>>>,
}

impl Session {
    fn run(&mut self, line: &str) -> Result<i32> {
        run_command_line(line, &mut self.ctx)
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn depth(&self) -> usize {
        self.ctx.ledger.len()
    }

    fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

fn session_with(settings: ShellSettings, answers: &[&str]) -> Session {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let prompter = ScriptedPrompter::new(answers);
    let asked = prompter.transcript();
    let ctx = ShellContext::new(settings, Box::new(prompter)).with_cwd(root.clone());
    Session { _dir: dir, root, ctx, asked }
}

fn session(answers: &[&str]) -> Session {
    session_with(ShellSettings::default(), answers)
}

#[test]
fn test_touch_rm_undo_scenario() {
    let mut s = session(&["y"]);

    s.run("touch a.txt").unwrap();
    assert!(s.path("a.txt").is_file());
    assert_eq!(s.depth(), 1);

    s.run("rm a.txt").unwrap();
    assert!(!s.path("a.txt").exists());
    assert!(s.path("a.txt.bak").is_file());
    assert_eq!(s.depth(), 2);
    assert_eq!(s.ctx.ledger.peek().unwrap().original, "rm a.txt");

    s.run("undo").unwrap();
    assert!(s.path("a.txt").is_file());
    assert!(!s.path("a.txt.bak").exists());
    assert_eq!(s.depth(), 1);

    s.run("undo").unwrap();
    assert!(!s.path("a.txt").exists());
    assert_eq!(s.depth(), 0);

    assert_eq!(s.run("undo").unwrap(), 0);
    assert!(!s.path("a.txt").exists());
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_mkdir_twice() {
    let mut s = session(&[]);
    s.run("mkdir foo").unwrap();

    let err = s.run("mkdir foo").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(s.depth(), 1);

    s.run("undo").unwrap();
    assert!(!s.path("foo").exists());
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_mkdir_parents_undo_removes_topmost() {
    let mut s = session(&[]);
    s.run("mkdir -p a/b/c").unwrap();
    assert!(s.path("a/b/c").is_dir());

    s.run("undo").unwrap();
    assert!(!s.path("a").exists());
}

#[test]
fn test_typo_correction_confirmed() {
    let mut s = session(&["y"]);
    s.run("mkdr test").unwrap();

    assert!(s.path("test").is_dir());
    assert_eq!(s.ctx.ledger.peek().unwrap().original, "mkdir test");
    assert!(s.asked()[0].contains("Did you mean 'mkdir'"));
}

#[test]
fn test_typo_correction_declined() {
    let mut s = session(&["n"]);
    let err = s.run("mkdr test").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(!s.path("test").exists());
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_read_only_and_failed_commands_leave_no_entry() {
    let mut s = session(&[]);
    s.run("ls").unwrap();
    s.run("help").unwrap();
    s.run("history").unwrap();
    assert!(s.run("rm missing.txt").is_err());
    assert!(s.run("copy missing.txt b.txt").is_err());
    assert_eq!(s.depth(), 0);
    assert_eq!(s.ctx.exit_code, 1);
}

#[test]
fn test_cd_undo() {
    let mut s = session(&[]);
    s.run("mkdir sub").unwrap();
    s.run("cd sub").unwrap();
    assert_eq!(s.ctx.cwd, s.path("sub"));
    assert_eq!(s.depth(), 2);

    s.run("undo").unwrap();
    assert_eq!(s.ctx.cwd, s.root);
    assert_eq!(s.depth(), 1);
}

#[test]
fn test_cd_missing_dir() {
    let mut s = session(&[]);
    let err = s.run("cd nowhere").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(s.ctx.cwd, s.root);
}

#[test]
fn test_move_undo() {
    let mut s = session(&[]);
    s.run("touch a.txt").unwrap();
    s.run("move a.txt b.txt").unwrap();
    assert!(!s.path("a.txt").exists());
    assert!(s.path("b.txt").is_file());

    s.run("undo").unwrap();
    assert!(s.path("a.txt").is_file());
    assert!(!s.path("b.txt").exists());
}

#[test]
fn test_move_into_directory_undo() {
    let mut s = session(&[]);
    s.run("touch a.txt").unwrap();
    s.run("mkdir box").unwrap();
    s.run("move a.txt box").unwrap();
    assert!(s.path("box/a.txt").is_file());

    s.run("undo").unwrap();
    assert!(s.path("a.txt").is_file());
    assert!(!s.path("box/a.txt").exists());
}

#[test]
fn test_rename_undo() {
    let mut s = session(&[]);
    s.run("touch old.txt").unwrap();
    s.run("rename old.txt new.txt").unwrap();
    assert!(s.path("new.txt").is_file());

    s.run("undo").unwrap();
    assert!(s.path("old.txt").is_file());
    assert!(!s.path("new.txt").exists());
}

#[test]
fn test_copy_undo_and_existing_destination() {
    let mut s = session(&[]);
    fs::write(s.path("a.txt"), "payload").unwrap();
    s.run("copy a.txt b.txt").unwrap();
    assert_eq!(fs::read_to_string(s.path("b.txt")).unwrap(), "payload");

    let err = s.run("copy a.txt b.txt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert_eq!(s.depth(), 1);

    s.run("undo").unwrap();
    assert!(!s.path("b.txt").exists());
    assert!(s.path("a.txt").is_file());
}

#[test]
fn test_append_undo() {
    let mut s = session(&[]);
    fs::write(s.path("notes.txt"), "one\n").unwrap();
    s.run("append notes.txt two words").unwrap();
    assert_eq!(fs::read_to_string(s.path("notes.txt")).unwrap(), "one\ntwo words\n");
    assert!(s.path("backup_notes.txt").is_file());

    s.run("undo").unwrap();
    assert_eq!(fs::read_to_string(s.path("notes.txt")).unwrap(), "one\n");
    assert!(!s.path("backup_notes.txt").exists());
}

#[test]
fn test_rmdir_undo_restores_tree() {
    let mut s = session(&["y"]);
    s.run("mkdir d").unwrap();
    s.run("touch d/x").unwrap();
    s.run("rmdir d").unwrap();
    assert!(!s.path("d").exists());
    assert!(s.path("d_backup/x").is_file());

    s.run("undo").unwrap();
    assert!(s.path("d/x").is_file());
    assert!(!s.path("d_backup").exists());
}

#[test]
fn test_rmdir_quiet_skips_confirmation() {
    let mut s = session(&[]);
    s.run("mkdir d").unwrap();
    s.run("rmdir /q d").unwrap();
    assert!(!s.path("d").exists());
    assert!(s.asked().is_empty());
}

#[test]
fn test_undo_is_lifo() {
    let mut s = session(&[]);
    s.run("mkdir a").unwrap();
    s.run("mkdir b").unwrap();
    s.run("touch c").unwrap();

    s.run("undo").unwrap();
    assert!(!s.path("c").exists());
    assert!(s.path("b").exists());

    s.run("undo").unwrap();
    assert!(!s.path("b").exists());
    assert!(s.path("a").exists());

    s.run("undo").unwrap();
    assert!(!s.path("a").exists());

    assert_eq!(s.run("undo").unwrap(), 0);
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_failed_undo_is_not_pushed_back() {
    let mut s = session(&[]);
    s.run("touch a.txt").unwrap();
    fs::remove_file(s.path("a.txt")).unwrap();

    let err = s.run("undo").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Undo);
    assert!(err.to_string().contains("touch a.txt"));
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_parse_error_has_no_side_effects() {
    let mut s = session(&[]);
    let err = s.run("touch \"unterminated").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Parse);
    assert_eq!(fs::read_dir(&s.root).unwrap().count(), 0);
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_help_flag_bypasses_execution() {
    let mut s = session(&[]);
    assert_eq!(s.run("mkdir foo --help").unwrap(), 0);
    assert_eq!(s.run("rm -h").unwrap(), 0);
    assert!(!s.path("foo").exists());
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_unknown_flag_dropped() {
    let mut s = session(&["drop"]);
    s.run("mkdir -q foo").unwrap();
    assert!(s.path("foo").is_dir());
    assert_eq!(s.ctx.ledger.peek().unwrap().original, "mkdir foo");
}

#[test]
fn test_rm_force_on_missing_file() {
    let mut s = session(&[]);
    assert_eq!(s.run("rm -f ghost.txt").unwrap(), 0);
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_rm_declined() {
    let mut s = session(&["n"]);
    s.run("touch a.txt").unwrap();
    let err = s.run("rm a.txt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(s.path("a.txt").exists());
    assert!(!s.path("a.txt.bak").exists());
    assert_eq!(s.depth(), 1);
}

#[test]
fn test_del_is_rm() {
    let mut s = session(&[]);
    s.run("touch a.txt").unwrap();
    s.run("del /q a.txt").unwrap();
    assert!(!s.path("a.txt").exists());
    s.run("undo").unwrap();
    assert!(s.path("a.txt").exists());
}

#[test]
fn test_touch_existing_creates_numbered_copy() {
    let mut s = session(&["new"]);
    s.run("touch a.txt").unwrap();
    s.run("touch a.txt").unwrap();
    assert!(s.path("a_1.txt").is_file());
    assert_eq!(s.depth(), 2);

    s.run("undo").unwrap();
    assert!(!s.path("a_1.txt").exists());
    assert!(s.path("a.txt").exists());
}

#[test]
fn test_touch_existing_cancelled() {
    let mut s = session(&["cancel"]);
    s.run("touch a.txt").unwrap();
    let err = s.run("touch a.txt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(s.depth(), 1);
}

#[test]
fn test_missing_operand_is_asked_for() {
    let mut s = session(&["asked.txt"]);
    s.run("touch").unwrap();
    assert!(s.path("asked.txt").is_file());

    let mut s = session(&[]);
    let err = s.run("touch").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn test_keep_retention_leaves_backups() {
    let settings = ShellSettings { backup_retention: BackupRetention::Keep, ..ShellSettings::default() };
    let mut s = session_with(settings, &["y"]);
    s.run("touch a.txt").unwrap();
    s.run("rm a.txt").unwrap();
    s.run("undo").unwrap();
    assert!(s.path("a.txt").is_file());
    assert!(s.path("a.txt.bak").is_file());
}

#[test]
fn test_exit_purges_backups() {
    let mut s = session(&["y"]);
    s.run("touch a.txt").unwrap();
    s.run("rm a.txt").unwrap();
    assert!(s.path("a.txt.bak").exists());

    s.run("exit").unwrap();
    assert!(s.ctx.exit_requested);
    assert!(!s.path("a.txt.bak").exists());
}

#[test]
fn test_sessions_are_independent() {
    let mut a = session(&[]);
    let mut b = session(&[]);
    a.run("touch one").unwrap();
    b.run("mkdir two").unwrap();
    b.run("mkdir three").unwrap();
    assert_eq!(a.depth(), 1);
    assert_eq!(b.depth(), 2);
    assert!(!a.path("two").exists());
}

#[test]
fn test_caution_declined() {
    let mut s = session(&["n"]);
    let err = s.run("diskpart").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(s.asked()[0].contains("data loss"));
}

#[test]
fn test_help_for_command() {
    let mut s = session(&[]);
    s.run("help mkdir").unwrap();
    let err = s.run("help nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn test_ask_falls_back_offline() {
    let mut s = session(&[]);
    assert_eq!(s.run("ask how do I use mkdir").unwrap(), 0);
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_user_commands_without_registry() {
    let mut s = session(&[]);
    let err = s.run("list-users").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Service);

    let err = s.run("add-user ada not-an-email").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
}

#[test]
fn test_strict_rejects_unknown_program() {
    let mut s = session(&[]);
    let err = s.run("definitely-not-a-command-xyz").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(err.to_string().contains("Unknown command"));
}

#[test]
fn test_loose_spawns_unknown_program() {
    let settings = ShellSettings { unknown_command: UnknownCommandPolicy::Loose, ..ShellSettings::default() };
    let mut s = session_with(settings, &[]);
    let err = s.run("definitely-not-a-command-xyz").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_move_directory_into_itself_is_refused() {
    let mut s = session(&[]);
    fs::create_dir_all(s.path("d/sub")).unwrap();

    let err = s.run("move d d/sub").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Precondition);
    assert!(s.path("d/sub").is_dir());
    assert!(!s.path("d/sub/d").exists());
    assert_eq!(fs::read_dir(s.path("d/sub")).unwrap().count(), 0);
    assert_eq!(s.depth(), 0);
}

#[test]
fn test_interrupt_at_confirmation_cancels() {
    let mut s = session(&["^C"]);
    s.run("touch a.txt").unwrap();

    let err = s.run("rm a.txt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(s.path("a.txt").is_file());
    assert!(!s.path("a.txt.bak").exists());
    assert_eq!(s.depth(), 1);
}

#[test]
fn test_interrupt_during_flag_repair_runs_nothing() {
    let mut s = session(&["^C"]);
    let err = s.run("mkdir -q foo").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(!s.path("foo").exists());
    assert_eq!(s.depth(), 0);
}

#[cfg(unix)]
mod external {
    use super::*;
    use crate::error::ShellError;

    #[test]
    fn test_external_success_is_not_undoable() {
        let mut s = session(&[]);
        assert_eq!(s.run("echo hello").unwrap(), 0);
        assert_eq!(s.ctx.exit_code, 0);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn test_external_failure_surfaces_status() {
        let mut s = session(&[]);
        let err = s.run("sh -c 'exit 3'").unwrap_err();
        assert!(matches!(err, ShellError::ExitStatus { code: 3, .. }));
        assert_eq!(s.ctx.exit_code, 3);
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn test_external_runs_in_session_cwd() {
        let mut s = session(&[]);
        s.run("sh -c 'touch made-by-sh'").unwrap();
        assert!(s.path("made-by-sh").is_file());
    }

    #[test]
    fn test_external_copy_is_undoable() {
        let mut s = session(&[]);
        s.run("touch a.txt").unwrap();
        s.run("cp a.txt b.txt").unwrap();
        assert!(s.path("b.txt").is_file());
        assert_eq!(s.depth(), 2);
        assert!(s.ctx.ledger.peek().unwrap().inverse.command.starts_with("rm /q"));

        s.run("undo").unwrap();
        assert!(!s.path("b.txt").exists());
        assert!(s.path("a.txt").exists());
    }

    #[test]
    fn test_external_failure_records_nothing() {
        let mut s = session(&[]);
        s.run("touch a.txt").unwrap();
        let err = s.run("mv a.txt no/such/dir/b.txt").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert_eq!(s.depth(), 1);
        assert!(s.path("a.txt").exists());
    }
}
