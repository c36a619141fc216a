use colored::*;
use std::collections::HashMap;

use crate::shell::commands::Executable;
use crate::shell::commands::builtins::{env, fs, remote, session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Builtin,
    External,
}

/// A flag token and its one-line description.
pub type FlagSpec = (&'static str, &'static str);

#[derive(Debug, Clone)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub kind: CommandKind,
    pub help: &'static str,
    pub usage: &'static str,
    /// Empty means unrestricted: flag validation is skipped.
    pub flags: &'static [FlagSpec],
    /// Warning that must be confirmed before the program runs.
    pub caution: Option<&'static str>,
}

impl CommandDescriptor {
    fn new(name: &'static str, kind: CommandKind, help: &'static str, usage: &'static str) -> Self {
        Self { name, kind, help, usage, flags: &[], caution: None }
    }

    pub fn builtin(name: &'static str, help: &'static str, usage: &'static str) -> Self {
        Self::new(name, CommandKind::Builtin, help, usage)
    }

    pub fn external(name: &'static str, help: &'static str, usage: &'static str) -> Self {
        Self::new(name, CommandKind::External, help, usage)
    }

    pub fn with_flags(mut self, flags: &'static [FlagSpec]) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_caution(mut self, caution: &'static str) -> Self {
        self.caution = Some(caution);
        self
    }

    pub fn valid_flags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.flags.iter().map(|(flag, _)| *flag)
    }

    pub fn has_flag_set(&self) -> bool {
        !self.flags.is_empty()
    }

    pub fn print_help(&self) {
        println!("{}", format!("Usage: {}", self.usage).cyan().bold());
        if !self.flags.is_empty() {
            println!("\nOptions:");
            let width = self.flags.iter().map(|(f, _)| f.len()).max().unwrap_or(0);
            for (flag, desc) in self.flags {
                let padding = " ".repeat(width - flag.len() + 2);
                println!("  {}{}{}", flag.green(), padding, desc);
            }
        }
        println!("{}", self.help.truecolor(255, 140, 0).bold());
    }
}

struct RegisteredCommand {
    descriptor: CommandDescriptor,
    handler: Option<Box<dyn Executable>>,
}

/// Ordered name → command table. Iteration order is registration order,
/// which is also the tie-break order for typo correction.
pub struct CommandRegistry {
    entries: Vec<RegisteredCommand>,
    index: HashMap<&'static str, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new(), index: HashMap::new() }
    }

    fn insert(&mut self, descriptor: CommandDescriptor, handler: Option<Box<dyn Executable>>) {
        assert!(
            !self.index.contains_key(descriptor.name),
            "command registered twice: {}",
            descriptor.name
        );
        self.index.insert(descriptor.name, self.entries.len());
        self.entries.push(RegisteredCommand { descriptor, handler });
    }

    pub fn register_builtin(&mut self, descriptor: CommandDescriptor, handler: Box<dyn Executable>) {
        debug_assert_eq!(descriptor.kind, CommandKind::Builtin);
        self.insert(descriptor, Some(handler));
    }

    pub fn register_external(&mut self, descriptor: CommandDescriptor) {
        debug_assert_eq!(descriptor.kind, CommandKind::External);
        self.insert(descriptor, None);
    }

    pub fn lookup(&self, name: &str) -> Option<&CommandDescriptor> {
        self.index.get(name).map(|&i| &self.entries[i].descriptor)
    }

    pub fn handler(&self, name: &str) -> Option<&dyn Executable> {
        self.index
            .get(name)
            .and_then(|&i| self.entries[i].handler.as_deref())
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.descriptor.name)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &CommandDescriptor> + '_ {
        self.entries.iter().map(|e| &e.descriptor)
    }

    /// The fixed command table every session starts with.
    pub fn standard() -> Self {
        let mut r = Self::new();

        // File & Directory Operations
        r.register_builtin(
            CommandDescriptor::builtin("cd", "Change directory: cd <path> and use 'cd ..' to navigate back to the previous directory", "cd <path>"),
            Box::new(env::cd::CdCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("ls", "List files and directories", "ls [path]"),
            Box::new(fs::ls::LsCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("dir", "List files and directories (Windows alternative to 'ls')", "dir [path]"),
            Box::new(fs::ls::LsCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("touch", "Create an empty file: touch <filename>", "touch <filename>"),
            Box::new(fs::touch::TouchCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("mkdir", "Create a new directory: mkdir <dirname>", "mkdir [-p] <dirname>")
                .with_flags(&[("-p", "Create missing parent directories")]),
            Box::new(fs::mkdir::MkdirCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("rmdir", "Delete a directory and its contents: rmdir <dirname>", "rmdir [/s] [/q] <dirname>")
                .with_flags(&[
                    ("/s", "Remove all subdirectories and files (always implied)"),
                    ("/q", "Quiet mode, do not ask for confirmation"),
                ]),
            Box::new(fs::rmdir::RmdirCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("rm", "Delete a file: rm <filename>", "rm [-f] [/q] <filename>")
                .with_flags(RM_FLAGS),
            Box::new(fs::rm::RmCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("del", "Delete a file (Windows alternative to 'rm')", "del [-f] [/q] <filename>")
                .with_flags(RM_FLAGS),
            Box::new(fs::rm::RmCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("rename", "Rename a file or directory: rename <old> <new>", "rename <old> <new>"),
            Box::new(fs::rename::RenameCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("copy", "Copy a file: copy <source> <destination>", "copy <source> <destination>"),
            Box::new(fs::copy::CopyCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("move", "Move a file: move <source> <destination>", "move <source> <destination>"),
            Box::new(fs::mv::MoveCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("append", "Append text to a file: append <filename> <text>", "append <filename> <text>"),
            Box::new(fs::append::AppendCommand),
        );
        r.register_external(
            CommandDescriptor::external("tree", "Display folder structure in tree format", "tree <options> <directory>")
                .with_flags(&[
                    ("/f", "Show files"),
                    ("/a", "Use ASCII characters"),
                    ("-a", "Show hidden files"),
                    ("-d", "List directories only"),
                    ("-f", "Print the full path prefix"),
                    ("-L", "Descend only the given number of levels"),
                ]),
        );

        // System Information & Management
        r.register_external(CommandDescriptor::external("whoami", "Display the current user", "whoami"));
        r.register_external(CommandDescriptor::external("hostname", "Show the computer's hostname", "hostname"));
        r.register_external(CommandDescriptor::external(
            "systeminfo",
            "Get detailed system information",
            "systeminfo",
        ));
        r.register_external(
            CommandDescriptor::external("tasklist", "List running processes", "tasklist <options>")
                .with_flags(&[
                    ("/fi", "Filter, e.g. /fi \"IMAGENAME eq process.exe\""),
                    ("/v", "Show detailed task information"),
                    ("/svc", "Display services associated with tasks"),
                ]),
        );
        r.register_external(
            CommandDescriptor::external("taskkill", "Kill a process by name or PID: taskkill /PID <id> /F", "taskkill /PID <id> /F or taskkill /IM <process_name> /F")
                .with_flags(&[
                    ("/PID", "Kill process by ID"),
                    ("/IM", "Kill process by name"),
                    ("/F", "Force kill the process"),
                    ("/T", "Kill the process tree"),
                ]),
        );

        // Networking & IP Management
        r.register_external(
            CommandDescriptor::external("ipconfig", "Show network configuration", "ipconfig <options>")
                .with_flags(&[
                    ("/all", "Show detailed network configuration"),
                    ("/release", "Release current IP address"),
                    ("/renew", "Renew IP address"),
                    ("/flushdns", "Purge the DNS resolver cache"),
                ]),
        );
        r.register_external(
            CommandDescriptor::external("ping", "Test network connectivity: ping <host>", "ping <host> [options]")
                .with_flags(&[
                    ("-n", "Number of echo requests to send (Windows)"),
                    ("-c", "Number of echo requests to send"),
                    ("-t", "Ping continuously until stopped (Ctrl + C)"),
                    ("-w", "Timeout"),
                    ("-l", "Buffer size"),
                    ("-i", "Interval / TTL"),
                    ("-4", "Force IPv4"),
                    ("-6", "Force IPv6"),
                ]),
        );
        r.register_external(
            CommandDescriptor::external("tracert", "Trace the route packets take to a destination", "tracert <destination>")
                .with_flags(&[
                    ("-d", "Do not resolve addresses to hostnames"),
                    ("-h", "Maximum number of hops"),
                    ("-w", "Timeout for each reply"),
                ]),
        );
        r.register_external(
            CommandDescriptor::external("netstat", "Display active network connections", "netstat <options>")
                .with_flags(&[
                    ("-a", "Show all connections and listening ports"),
                    ("-n", "Display addresses in numerical form"),
                    ("-o", "Show process IDs (PIDs) for connections"),
                    ("-p", "Show connections for the given protocol"),
                    ("-r", "Display the routing table"),
                    ("-s", "Display per-protocol statistics"),
                ]),
        );
        r.register_external(CommandDescriptor::external(
            "nslookup",
            "Get DNS information for a domain: nslookup <domain>",
            "nslookup <domain>",
        ));

        // Disk & Storage Commands
        r.register_external(
            CommandDescriptor::external("diskpart", "Manage disk partitions", "diskpart")
                .with_caution("⚠ Warning: Disk partitioning can cause data loss! Continue?"),
        );
        r.register_external(
            CommandDescriptor::external("chkdsk", "Check disk for errors", "chkdsk <drive> <options>")
                .with_flags(&[
                    ("/f", "Fix errors on the disk"),
                    ("/r", "Locate bad sectors and recover readable data"),
                    ("/x", "Force the volume to dismount first"),
                    ("/scan", "Run an online scan"),
                ]),
        );
        r.register_external(CommandDescriptor::external(
            "wmic",
            "Windows Management Instrumentation Command-line: wmic logicaldisk get",
            "wmic logicaldisk get <options>",
        ));

        // Shell & Exit Commands
        r.register_builtin(
            CommandDescriptor::builtin("help", "Show available commands or details for a specific command using '<command> --help'.", "help [command]"),
            Box::new(session::help::HelpCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("exit", "Exit the shell", "exit"),
            Box::new(env::exit::ExitCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("undo", "Undo the last command", "undo"),
            Box::new(session::undo::UndoCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("history", "Show recent commands and the undo stack", "history"),
            Box::new(session::history::HistoryCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("ask", "Ask the assistant a question about the command line", "ask <question>"),
            Box::new(remote::ask::AskCommand),
        );

        // User Management
        r.register_builtin(
            CommandDescriptor::builtin("list-users", "List all users in the user registry", "list-users"),
            Box::new(remote::users::ListUsersCommand),
        );
        r.register_builtin(
            CommandDescriptor::builtin("add-user", "Add a new user: add-user <name> <email>", "add-user <name> <email>"),
            Box::new(remote::users::AddUserCommand),
        );

        r
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

const RM_FLAGS: &[FlagSpec] = &[
    ("-f", "Ignore a missing file"),
    ("/q", "Quiet mode, do not ask for confirmation"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_order() {
        let registry = CommandRegistry::standard();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(&names[..5], &["cd", "ls", "dir", "touch", "mkdir"]);
        assert!(names.iter().position(|n| *n == "mkdir") < names.iter().position(|n| *n == "rmdir"));
        assert_eq!(names.last(), Some(&"add-user"));
    }

    #[test]
    fn test_lookup_and_kinds() {
        let registry = CommandRegistry::standard();
        assert_eq!(registry.lookup("mkdir").unwrap().kind, CommandKind::Builtin);
        assert_eq!(registry.lookup("ping").unwrap().kind, CommandKind::External);
        assert!(registry.lookup("ping").unwrap().has_flag_set());
        assert!(!registry.lookup("copy").unwrap().has_flag_set());
        assert!(registry.lookup("diskpart").unwrap().caution.is_some());
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_only_builtins_have_handlers() {
        let registry = CommandRegistry::standard();
        for d in registry.descriptors() {
            assert_eq!(
                registry.handler(d.name).is_some(),
                d.kind == CommandKind::Builtin,
                "{}",
                d.name
            );
        }
    }

    #[test]
    #[should_panic(expected = "registered twice")]
    fn test_duplicate_registration_panics() {
        let mut registry = CommandRegistry::new();
        registry.register_external(CommandDescriptor::external("ping", "", ""));
        registry.register_external(CommandDescriptor::external("ping", "", ""));
    }
}
