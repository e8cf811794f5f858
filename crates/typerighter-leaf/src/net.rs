//! Network address and locator types
//!
//! Patterns are assembled from shared pieces (octets, 16-bit hex groups) the
//! first time a kind is used. Matching is case-insensitive and must cover the
//! whole value.

use std::sync::Arc;

use once_cell::sync::Lazy;
use typerighter_core::Definition;

use crate::pattern::{pattern_definition, PatternKind, PatternType};

const OCTET: &str = "(?:25[0-5]|2[0-4][0-9]|[01]?[0-9]{1,2})";
const H16: &str = "[0-9a-f]{1,4}";

static IPV4_BODY: Lazy<String> = Lazy::new(|| format!(r"(?:{OCTET}\.){{3}}{OCTET}"));

static IPV6_BODY: Lazy<String> = Lazy::new(|| {
    let h = H16;
    let l = format!("(?:{h}:{h}|{})", IPV4_BODY.as_str());
    let alternatives = [
        format!("(?:{h}:){{6}}{l}"),
        format!("::(?:{h}:){{5}}{l}"),
        format!("(?:{h})?::(?:{h}:){{4}}{l}"),
        format!("(?:(?:{h}:){{0,1}}{h})?::(?:{h}:){{3}}{l}"),
        format!("(?:(?:{h}:){{0,2}}{h})?::(?:{h}:){{2}}{l}"),
        format!("(?:(?:{h}:){{0,3}}{h})?::{h}:{l}"),
        format!("(?:(?:{h}:){{0,4}}{h})?::{l}"),
        format!("(?:(?:{h}:){{0,5}}{h})?::{h}"),
        format!("(?:(?:{h}:){{0,6}}{h})?::"),
    ];
    format!("(?:{})", alternatives.join("|"))
});

static IPV4: Lazy<String> = Lazy::new(|| format!("(?i)^{}$", IPV4_BODY.as_str()));
static IPV6: Lazy<String> = Lazy::new(|| format!("(?i)^{}$", IPV6_BODY.as_str()));
static IP: Lazy<String> = Lazy::new(|| {
    format!("(?i)^(?:{}|{})$", IPV4_BODY.as_str(), IPV6_BODY.as_str())
});

static MAC: Lazy<String> = Lazy::new(|| {
    let x = "[0-9a-f]";
    format!(
        r"(?i)^(?:(?:{x}{{2}}-){{5}}{x}{{2}}|(?:{x}{{2}}:){{5}}{x}{{2}}|{x}{{12}}|{x}{{6}}[-:]{x}{{6}}|{x}{{4}}(?:\.{x}{{4}}){{2}})$"
    )
});

const URL: &str = concat!(
    r"(?i)^[a-z0-9.+-]+://",
    r"(?:[^\s@/]+@)?",
    r"(?:\[[0-9a-f:]+\]|[^\s/?#:@\[\]]+)",
    r"(?::[0-9]{2,5})?",
    r"(?:/[^\s?#]*)?",
    r"(?:\?[^\s#]*)?",
    r"(?:#\S*)?$",
);

const EMAIL: &str = concat!(
    r"(?i)^(?:",
    r"[-a-z0-9!#$%&'*+/=?^_`{|}~]+(?:\.[-a-z0-9!#$%&'*+/=?^_`{|}~]+)*",
    r#"|"(?:[\x21\x23-\x5b\x5d-\x7e\s]|\\[\x21-\x7e\s])*""#,
    r")@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$",
);

/// IPv4 or IPv6 address
#[derive(Debug, Clone, Copy)]
pub struct IpAddress;

impl PatternKind for IpAddress {
    const NAME: &'static str = "IPAddressType";

    fn pattern() -> &'static str {
        &IP
    }

    fn definition() -> &'static Arc<Definition> {
        static DEFINITION: Lazy<Arc<Definition>> =
            Lazy::new(|| pattern_definition::<IpAddress>().build());
        &DEFINITION
    }
}

/// Dotted-quad IPv4 address
#[derive(Debug, Clone, Copy)]
pub struct Ipv4;

impl PatternKind for Ipv4 {
    const NAME: &'static str = "IPv4Type";

    fn pattern() -> &'static str {
        &IPV4
    }

    fn definition() -> &'static Arc<Definition> {
        static DEFINITION: Lazy<Arc<Definition>> =
            Lazy::new(|| pattern_definition::<Ipv4>().build());
        &DEFINITION
    }
}

/// IPv6 address, including compressed and IPv4-suffixed forms
#[derive(Debug, Clone, Copy)]
pub struct Ipv6;

impl PatternKind for Ipv6 {
    const NAME: &'static str = "IPv6Type";

    fn pattern() -> &'static str {
        &IPV6
    }

    fn definition() -> &'static Arc<Definition> {
        static DEFINITION: Lazy<Arc<Definition>> =
            Lazy::new(|| pattern_definition::<Ipv6>().build());
        &DEFINITION
    }
}

/// 48-bit MAC address in colon, hyphen, dot or bare notation
#[derive(Debug, Clone, Copy)]
pub struct MacAddress;

impl PatternKind for MacAddress {
    const NAME: &'static str = "MACAddressType";

    fn pattern() -> &'static str {
        &MAC
    }

    fn definition() -> &'static Arc<Definition> {
        static DEFINITION: Lazy<Arc<Definition>> =
            Lazy::new(|| pattern_definition::<MacAddress>().build());
        &DEFINITION
    }
}

/// Absolute URL with a scheme and host
#[derive(Debug, Clone, Copy)]
pub struct Url;

impl PatternKind for Url {
    const NAME: &'static str = "URLType";

    fn pattern() -> &'static str {
        URL
    }

    fn definition() -> &'static Arc<Definition> {
        static DEFINITION: Lazy<Arc<Definition>> =
            Lazy::new(|| pattern_definition::<Url>().build());
        &DEFINITION
    }
}

/// Email address with a dotted domain
#[derive(Debug, Clone, Copy)]
pub struct Email;

impl PatternKind for Email {
    const NAME: &'static str = "EmailType";

    fn pattern() -> &'static str {
        EMAIL
    }

    fn definition() -> &'static Arc<Definition> {
        static DEFINITION: Lazy<Arc<Definition>> =
            Lazy::new(|| pattern_definition::<Email>().build());
        &DEFINITION
    }
}

/// IPv4 or IPv6 address
pub type IpAddressType = PatternType<IpAddress>;
/// IPv4 address
pub type Ipv4Type = PatternType<Ipv4>;
/// IPv6 address
pub type Ipv6Type = PatternType<Ipv6>;
/// MAC address
pub type MacAddressType = PatternType<MacAddress>;
/// URL
pub type UrlType = PatternType<Url>;
/// Email address
pub type EmailType = PatternType<Email>;

#[cfg(test)]
mod tests {
    use super::*;
    use typerighter_core::{Type, Value};

    const V6: &str = "FE80:CD00:0000:0CDE:1257:0000:211E:729C";

    fn accepts<T: Type>(ty: &T, good: &[&str], bad: &[&str]) {
        assert!(ty.validate(&Value::Unset).is_ok());
        for s in good {
            assert!(ty.validate(&Value::from(*s)).is_ok(), "{} should accept {s}", ty.name());
        }
        for s in bad {
            assert!(ty.validate(&Value::from(*s)).is_err(), "{} should reject {s}", ty.name());
        }
    }

    #[test]
    fn ip_address_conversion_is_identity() {
        let ip = IpAddressType::builder().build().unwrap();
        let example = Value::from("192.168.1.1");
        assert_eq!(ip.to_native(&example).unwrap(), example);
        assert_eq!(ip.to_primitive(&example).unwrap(), example);
    }

    #[test]
    fn ip_address_accepts_both_families() {
        let ip = IpAddressType::builder().build().unwrap();
        accepts(&ip, &["192.168.1.1", V6, "::1"], &["weeeeeee", "00:25:96:FF:FE"]);
    }

    #[test]
    fn ipv4_only() {
        let ip = Ipv4Type::builder().build().unwrap();
        accepts(&ip, &["192.168.1.1", "255.255.255.255"], &["weeeeeee", V6, "256.1.1.1"]);
    }

    #[test]
    fn ipv6_only() {
        let ip = Ipv6Type::builder().build().unwrap();
        accepts(
            &ip,
            &[V6, "::", "::ffff:192.168.1.1", "2001:db8::8a2e:370:7334"],
            &["weeeeeee", "192.168.1.1"],
        );
    }

    #[test]
    fn mac_address_notations() {
        let mac = MacAddressType::builder().build().unwrap();
        accepts(
            &mac,
            &["00:25:96:FF:FE:12", "00-25-96-ff-fe-12", "002596FFFE12", "0025.96FF.FE12"],
            &["weeeeeee", "00:25:96:FF:FE"],
        );
    }

    #[test]
    fn url_requires_scheme_and_host() {
        let url = UrlType::builder().build().unwrap();
        accepts(
            &url,
            &[
                "http://word.com",
                "http://word.co.uk",
                "spotify://workspace/ohyeah",
                "https://user@host:8080/p?q=1#frag",
                "http://[fe80::1]/x",
            ],
            &["weeeeeee", "word.com", "file:///some/path"],
        );
    }

    #[test]
    fn email_local_and_domain() {
        let email = EmailType::builder().build().unwrap();
        accepts(
            &email,
            &["ih@ve.one", "word+something@google.com", "word@whatevuh.co.uk"],
            &["weeeeeee", "google.com", "a@-bad.com"],
        );
    }

    #[test]
    fn explicit_regex_overrides_preset() {
        let ip = Ipv4Type::builder().regex("10\\.").build().unwrap();
        assert!(ip.validate(&Value::from("10.0.0.1")).is_ok());
        assert!(ip.validate(&Value::from("192.168.1.1")).is_err());
    }

    #[test]
    fn schematic_names_kind() {
        let mac = MacAddressType::builder().required(true).build().unwrap();
        let json = mac.to_schematic().to_json();
        assert_eq!(json[0], "MACAddressType");
        assert_eq!(json[1]["required"], true);
        assert_eq!(json[1]["regex"], MacAddress::pattern());
    }
}
