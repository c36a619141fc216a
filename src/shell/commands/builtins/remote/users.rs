// List-users / add-user commands

use colored::*;

use crate::error::{Result, ShellError};
use crate::services::users::{UserRegistry, print_users, validate_email};
use crate::shell::commands::builtins::common::{require_operand, usage};
use crate::shell::commands::{Executable, Invocation};
use crate::shell::context::ShellContext;

fn registry(ctx: &mut ShellContext) -> Result<&mut Box<dyn UserRegistry>> {
    ctx.users.as_mut().ok_or_else(|| {
        ShellError::Service("User registry is not configured (set SUPABASE_URL and SUPABASE_KEY)".to_string())
    })
}

pub struct ListUsersCommand;
impl Executable for ListUsersCommand {
    fn execute(&self, _inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        let users = registry(ctx)?.list_users()?;
        print_users(&users);
        Ok(0)
    }
}

pub struct AddUserCommand;
impl Executable for AddUserCommand {
    fn execute(&self, inv: &Invocation, ctx: &mut ShellContext) -> Result<i32> {
        if inv.operands.len() > 2 {
            return Err(usage(inv, ctx));
        }
        let name = require_operand(inv, ctx, 0, "Enter user name")?;
        let email = require_operand(inv, ctx, 1, "Enter user email")?;
        validate_email(&email)?;

        registry(ctx)?.add_user(&name, &email)?;
        println!("{} Successfully added user: {} ({})", "✅".green(), name, email);
        Ok(0)
    }
}
