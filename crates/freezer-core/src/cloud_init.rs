//! Cloud-init user data for recreated servers

const HEADER: &str = "#cloud-config\nruncmd:\n";
const ADDR_TEMPLATE: &str = "ip addr add 0.0.0.0/32 dev eth0";
const ADDR_PLACEHOLDER: &str = "0.0.0.0/32";

/// User data binding `ips` to `eth0`, or `None` when there is nothing to bind
///
/// ```text
/// #cloud-config
/// runcmd:
/// - [ip, addr, add, 10.0.0.5/32, 10.0.0.6/32, dev, eth0]
/// ```
pub fn floating_ip_user_data<S: AsRef<str>>(ips: &[S]) -> Option<String> {
    if ips.is_empty() {
        return None;
    }

    let addrs = ips
        .iter()
        .map(|ip| format!("{}/32", ip.as_ref()))
        .collect::<Vec<_>>()
        .join(" ");
    let command = ADDR_TEMPLATE.replace(ADDR_PLACEHOLDER, &addrs);
    let args = command.split(' ').collect::<Vec<_>>().join(", ");

    Some(format!("{}- [{}]", HEADER, args))
}
