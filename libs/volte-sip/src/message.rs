//! SIP message parsing and serialization.

use crate::error::ParseError;
use crate::reason_phrase;
use crate::uri::Uri;
use std::fmt;

/// SIP request methods routed by the simulator. Anything else is carried
/// as `Other` and passes through the proxies unrouted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Register,
    Invite,
    Prack,
    Update,
    Ack,
    Bye,
    Other(String),
}

impl Method {
    pub fn from_token(tok: &str) -> Self {
        match tok.to_ascii_uppercase().as_str() {
            "REGISTER" => Method::Register,
            "INVITE" => Method::Invite,
            "PRACK" => Method::Prack,
            "UPDATE" => Method::Update,
            "ACK" => Method::Ack,
            "BYE" => Method::Bye,
            _ => Method::Other(tok.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Register => "REGISTER",
            Method::Invite => "INVITE",
            Method::Prack => "PRACK",
            Method::Update => "UPDATE",
            Method::Ack => "ACK",
            Method::Bye => "BYE",
            Method::Other(s) => s,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `METHOD sip:uri SIP/2.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: Method,
    pub uri: Uri,
}

/// `SIP/2.0 code reason`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub code: u16,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request(RequestLine),
    Status(StatusLine),
}

/// `From`/`To` header value: optional display name, a URI in angle
/// brackets, and trailing parameters (`;tag=...`) kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameAddr {
    pub display: Option<String>,
    pub uri: Uri,
    pub params: String,
}

impl NameAddr {
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if let Some(open) = s.find('<') {
            let close = s[open..]
                .find('>')
                .map(|i| open + i)
                .ok_or_else(|| ParseError::InvalidUri(s.to_string()))?;
            let display = s[..open].trim().trim_matches('"');
            Ok(Self {
                display: if display.is_empty() {
                    None
                } else {
                    Some(display.to_string())
                },
                uri: Uri::parse(&s[open + 1..close])?,
                params: s[close + 1..].to_string(),
            })
        } else {
            // Bare URI, possibly with ;params after the domain.
            let (uri_part, params) = match s.find(';') {
                Some(i) => (&s[..i], s[i..].to_string()),
                None => (s, String::new()),
            };
            Ok(Self {
                display: None,
                uri: Uri::parse(uri_part)?,
                params,
            })
        }
    }

    pub fn username(&self) -> &str {
        &self.uri.username
    }
}

impl fmt::Display for NameAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref d) = self.display {
            write!(f, "\"{}\" ", d)?;
        }
        write!(f, "<{}>{}", self.uri, self.params)
    }
}

/// A parsed SIP message: the start line, the headers the signaling core
/// understands, any remaining headers verbatim, and the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub start: StartLine,
    /// `Via` values, first entry is the most recent hop.
    pub via: Vec<String>,
    pub from: NameAddr,
    pub to: NameAddr,
    pub call_id: String,
    pub cseq: String,
    pub max_forwards: u32,
    pub contact: Option<String>,
    pub authorization: Option<String>,
    pub www_authenticate: Option<String>,
    pub access_network_info: Option<String>,
    pub service_route: Option<String>,
    /// Headers not interpreted here, preserved in order.
    pub extra: Vec<(String, String)>,
    pub body: String,
}

impl Message {
    /// Build a minimal request. Used by tests and by the eNodeB access proxy.
    pub fn request(method: Method, uri: Uri) -> Self {
        Self {
            start: StartLine::Request(RequestLine { method, uri }),
            via: Vec::new(),
            from: NameAddr::default(),
            to: NameAddr::default(),
            call_id: String::new(),
            cseq: String::new(),
            max_forwards: 70,
            contact: None,
            authorization: None,
            www_authenticate: None,
            access_network_info: None,
            service_route: None,
            extra: Vec::new(),
            body: String::new(),
        }
    }

    /// Build a response correlated to `req`: the transaction headers
    /// (`Via`, `From`, `To`, `Call-ID`, `CSeq`) are copied over.
    pub fn response(code: u16, req: &Message) -> Self {
        Self {
            start: StartLine::Status(StatusLine {
                code,
                reason: reason_phrase(code).to_string(),
            }),
            via: req.via.clone(),
            from: req.from.clone(),
            to: req.to.clone(),
            call_id: req.call_id.clone(),
            cseq: req.cseq.clone(),
            max_forwards: 70,
            contact: None,
            authorization: None,
            www_authenticate: None,
            access_network_info: None,
            service_route: None,
            extra: Vec::new(),
            body: String::new(),
        }
    }

    /// Parse a message from its wire text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let (head, body) = match text.split_once("\r\n\r\n") {
            Some((h, b)) => (h, b.to_string()),
            None => (text.trim_end_matches("\r\n"), String::new()),
        };
        let mut lines = head.split("\r\n");
        let start_line = lines.next().filter(|l| !l.is_empty()).ok_or(ParseError::Empty)?;
        let start = parse_start_line(start_line)?;

        let mut msg = Message::request(Method::Other(String::new()), Uri::default());
        msg.start = start;
        msg.body = body;

        for line in lines {
            if line.is_empty() {
                continue;
            }
            let (name, value) = match line.split_once(':') {
                Some((n, v)) => (n.trim(), v.trim()),
                None => continue, // malformed header line, dropped
            };
            match name.to_ascii_lowercase().as_str() {
                "via" => msg.via.push(value.to_string()),
                "from" => msg.from = NameAddr::parse(value)?,
                "to" => msg.to = NameAddr::parse(value)?,
                "call-id" => msg.call_id = value.to_string(),
                "cseq" => msg.cseq = value.to_string(),
                "max-forwards" => msg.max_forwards = value.parse().unwrap_or(70),
                "contact" => msg.contact = Some(value.to_string()),
                "authorization" => msg.authorization = Some(value.to_string()),
                "www-authenticate" => msg.www_authenticate = Some(value.to_string()),
                "p-access-network-info" => msg.access_network_info = Some(value.to_string()),
                "service-route" => msg.service_route = Some(value.to_string()),
                "content-length" => {} // recomputed on output
                _ => msg.extra.push((name.to_string(), value.to_string())),
            }
        }
        Ok(msg)
    }

    pub fn is_request(&self) -> bool {
        matches!(self.start, StartLine::Request(_))
    }

    pub fn method(&self) -> Option<&Method> {
        match &self.start {
            StartLine::Request(rl) => Some(&rl.method),
            StartLine::Status(_) => None,
        }
    }

    pub fn request_uri(&self) -> Option<&Uri> {
        match &self.start {
            StartLine::Request(rl) => Some(&rl.uri),
            StartLine::Status(_) => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match &self.start {
            StartLine::Status(sl) => Some(sl.code),
            StartLine::Request(_) => None,
        }
    }

    /// Prepend a `Via` entry: this node becomes the most recent hop.
    pub fn push_via(&mut self, entry: impl Into<String>) {
        self.via.insert(0, entry.into());
    }

    /// Remove and return the most recent `Via` hop.
    pub fn pop_via(&mut self) -> Option<String> {
        if self.via.is_empty() {
            None
        } else {
            Some(self.via.remove(0))
        }
    }

    pub fn first_via(&self) -> Option<&str> {
        self.via.first().map(String::as_str)
    }

    pub fn decrement_max_forwards(&mut self) {
        self.max_forwards = self.max_forwards.saturating_sub(1);
    }
}

/// A unique-enough `branch` parameter for a `Via` entry the proxies add.
pub fn via_branch() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("z9hG4bK{nanos:x}")
}

fn parse_start_line(line: &str) -> Result<StartLine, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first().is_some_and(|t| t.starts_with("SIP")) {
        // SIP/2.0 code reason
        let code_tok = tokens.get(1).ok_or_else(|| ParseError::InvalidStartLine(line.to_string()))?;
        let code: u16 = code_tok
            .parse()
            .map_err(|_| ParseError::InvalidStatusCode(code_tok.to_string()))?;
        let reason = tokens.get(2..).map(|r| r.join(" ")).unwrap_or_default();
        Ok(StartLine::Status(StatusLine { code, reason }))
    } else if tokens.len() >= 3 && tokens[2].starts_with("SIP") {
        Ok(StartLine::Request(RequestLine {
            method: Method::from_token(tokens[0]),
            uri: Uri::parse(tokens[1])?,
        }))
    } else {
        Err(ParseError::InvalidStartLine(line.to_string()))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.start {
            StartLine::Request(rl) => write!(f, "{} {} SIP/2.0\r\n", rl.method, rl.uri)?,
            StartLine::Status(sl) => write!(f, "SIP/2.0 {} {}\r\n", sl.code, sl.reason)?,
        }
        for via in &self.via {
            write!(f, "Via: {}\r\n", via)?;
        }
        write!(f, "From: {}\r\n", self.from)?;
        write!(f, "To: {}\r\n", self.to)?;
        if !self.call_id.is_empty() {
            write!(f, "Call-ID: {}\r\n", self.call_id)?;
        }
        if !self.cseq.is_empty() {
            write!(f, "CSeq: {}\r\n", self.cseq)?;
        }
        write!(f, "Max-Forwards: {}\r\n", self.max_forwards)?;
        if let Some(ref v) = self.contact {
            write!(f, "Contact: {}\r\n", v)?;
        }
        if let Some(ref v) = self.authorization {
            write!(f, "Authorization: {}\r\n", v)?;
        }
        if let Some(ref v) = self.www_authenticate {
            write!(f, "WWW-Authenticate: {}\r\n", v)?;
        }
        if let Some(ref v) = self.access_network_info {
            write!(f, "P-Access-Network-Info: {}\r\n", v)?;
        }
        if let Some(ref v) = self.service_route {
            write!(f, "Service-Route: {}\r\n", v)?;
        }
        for (name, value) in &self.extra {
            write!(f, "{}: {}\r\n", name, value)?;
        }
        write!(f, "Content-Length: {}\r\n\r\n{}", self.body.len(), self.body)
    }
}
