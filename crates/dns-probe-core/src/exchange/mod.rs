//! DNS query construction and the UDP exchange
//!
//! Probes only ever ask one question: the A record of the target, class IN,
//! recursion desired.

mod udp;

pub use udp::UdpExchange;

use crate::error::{Error, Result};
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use std::borrow::Cow;

/// Build the probe query for a fully-qualified `target`
pub fn build_query(target: &str) -> Result<Message> {
    let name = Name::from_ascii(target)
        .map_err(|e| Error::invalid_target(format!("'{}': {}", target, e)))?;

    let mut query = Query::query(name, RecordType::A);
    query.set_query_class(DNSClass::IN);

    let mut message = Message::new();
    message
        .set_id(fastrand::u16(..))
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    message.add_query(query);

    Ok(message)
}

/// Standard mnemonic for a response code, e.g. `NOERROR` or `NXDOMAIN`
pub fn rcode_name(rcode: ResponseCode) -> Cow<'static, str> {
    let name = match u16::from(rcode) {
        0 => "NOERROR",
        1 => "FORMERR",
        2 => "SERVFAIL",
        3 => "NXDOMAIN",
        4 => "NOTIMP",
        5 => "REFUSED",
        6 => "YXDOMAIN",
        7 => "YXRRSET",
        8 => "NXRRSET",
        9 => "NOTAUTH",
        10 => "NOTZONE",
        // 16 is shared by BADVERS and BADSIG
        16 => "BADSIG",
        17 => "BADKEY",
        18 => "BADTIME",
        19 => "BADMODE",
        20 => "BADNAME",
        21 => "BADALG",
        22 => "BADTRUNC",
        23 => "BADCOOKIE",
        other => return Cow::Owned(format!("RCODE{}", other)),
    };
    Cow::Borrowed(name)
}
