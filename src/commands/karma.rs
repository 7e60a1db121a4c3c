// `karma [groupId]`

use crate::commands::{authorize, Session};
use crate::error::Result;
use crate::output::{emit, KarmaTable};

pub fn run(session: &mut Session, group_id: Option<&str>) -> Result<()> {
    let api = authorize(session.store, &mut *session.transport)?;
    let karma = api.karma(group_id)?;
    emit(&mut *session.out, session.mode, &karma.raw, &KarmaTable(&karma.data))?;
    Ok(())
}
