use crate::domain::balance::{MemberBalance, NetPosition};
use crate::domain::money::Money;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct BalanceRow<'a> {
    user_id: &'a str,
    name: &'a str,
    you_owe: Money,
    owes_you: Money,
    net: Money,
}

#[derive(Serialize)]
struct NetRow<'a> {
    user_id: &'a str,
    name: &'a str,
    net: Money,
}

/// Writes balance reports as CSV.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes one row per member, with a `user_id,name,you_owe,owes_you,net` header.
    pub fn write_members(&mut self, members: &[MemberBalance]) -> Result<()> {
        if members.is_empty() {
            self.writer
                .write_record(["user_id", "name", "you_owe", "owes_you", "net"])?;
        }
        for m in members {
            self.writer.serialize(BalanceRow {
                user_id: m.user_id.as_str(),
                name: &m.name,
                you_owe: m.you_owe,
                owes_you: m.owes_you,
                net: m.net,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn write_net_positions(&mut self, positions: &[NetPosition]) -> Result<()> {
        if positions.is_empty() {
            self.writer.write_record(["user_id", "name", "net"])?;
        }
        for p in positions {
            self.writer.serialize(NetRow {
                user_id: p.user_id.as_str(),
                name: &p.name,
                net: p.net,
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
