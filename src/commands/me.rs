// `me`: which account does the stored token belong to.

use crate::commands::{authorize, Session};
use crate::error::Result;
use crate::output::{emit, Profile};

pub fn run(session: &mut Session) -> Result<()> {
    let api = authorize(session.store, &mut *session.transport)?;
    let me = api.me()?;
    emit(&mut *session.out, session.mode, &me.raw, &Profile(&me.data))?;
    Ok(())
}
