//! Built-in tool table.
//!
//! Every entry can be overridden or disabled from the config file.

use crate::descriptor::{PresetParam, ToolDescriptor, ToolPreset, ARGS_PLACEHOLDER};

const DIRSEARCH_EXTENSIONS: &str = "php,asp,aspx,jsp,html,js,txt";

/// All built-in descriptors, in no particular order.
pub fn builtin_tools() -> Vec<ToolDescriptor> {
    vec![
        nmap(),
        dirsearch(),
        // ProjectDiscovery
        ToolDescriptor::new("katana", "katana")
            .with_description("Web crawler and spider (ProjectDiscovery katana)")
            .with_default_args(["-u", "https://example.com"]),
        ToolDescriptor::new("nuclei", "nuclei")
            .with_description("Template-based vulnerability scanner (ProjectDiscovery nuclei)")
            .with_default_args(["-u", "https://example.com"]),
        ToolDescriptor::new("httpx", "httpx")
            .with_description("HTTP probing toolkit (ProjectDiscovery httpx)")
            .with_default_args(["-u", "https://example.com"]),
        ToolDescriptor::new("subfinder", "subfinder")
            .with_description("Passive subdomain enumeration (ProjectDiscovery subfinder)")
            .with_default_args(["-d", "example.com"]),
        ToolDescriptor::new("ffuf", "ffuf")
            .with_description("Web fuzzer; FUZZ in the URL marks the injection point")
            .with_default_args([
                "-u",
                "https://example.com/FUZZ",
                "-w",
                "/usr/share/wordlists/dirb/common.txt",
            ]),
    ]
}

fn nmap() -> ToolDescriptor {
    ToolDescriptor::new("nmap", "nmap")
        .with_description("Network mapper: host discovery, port scanning, service and OS detection")
        .with_default_args(["-Pn", "-T4", "scanme.nmap.org"])
        .with_preset(
            ToolPreset::new(
                "full_port_scan",
                ["-Pn", "-sS", "-p", "1-65535", "-T{timing}", "{args}", "{target}"],
            )
            .with_description("Stealth SYN scan of all 65535 TCP ports")
            .with_param(timing("4")),
        )
        .with_preset(
            port_scan("stealth_syn_scan", "-sS", "1-1000", "3")
                .with_description("Quieter SYN scan of selected ports"),
        )
        .with_preset(
            port_scan("tcp_connect_scan", "-sT", "1-1024", "3")
                .with_description("Full TCP connect scan; works without root"),
        )
        .with_preset(
            port_scan("udp_scan", "-sU", "1-1000", "4")
                .with_description("UDP port scan; requires root or CAP_NET_RAW"),
        )
        .with_preset(
            ToolPreset::new("os_detection_scan", ["-Pn", "-O", "{args}", "{target}"])
                .with_description("Operating system fingerprinting (add -F for a faster pre-scan)"),
        )
        .with_preset(
            // No -Pn: discovering live hosts is the point.
            ToolPreset::new("ping_sweep", ["-sn", "{args}", "{target}"])
                .with_description("ICMP ping sweep over a network (CIDR)"),
        )
        .with_preset(
            ToolPreset::new("aggressive_scan", ["-Pn", "-A", "{args}", "{target}"])
                .with_description("OS, version, script scan and traceroute"),
        )
}

fn port_scan(name: &str, technique: &str, ports: &str, timing_level: &str) -> ToolPreset {
    ToolPreset::new(
        name,
        ["-Pn", technique, "-p{ports}", "-T{timing}", "{args}", "{target}"],
    )
    .with_param(
        PresetParam::optional("ports", ports)
            .with_description("Ports to scan, e.g. 22,80,443 or 1-1000; empty for nmap's default"),
    )
    .with_param(timing(timing_level))
}

fn timing(level: &str) -> PresetParam {
    PresetParam::optional("timing", level).with_description("Timing template level, 0 (paranoid) to 5 (insane)")
}

fn dirsearch() -> ToolDescriptor {
    ToolDescriptor::new("dirsearch", "dirsearch")
        .with_description("Web path brute-forcer")
        .with_default_args(["-q", "-u", "https://example.com"])
        .with_preset(
            dirsearch_scan("quick_scan", &[])
                .with_description("Basic scan with common extensions, 2xx-3xx only"),
        )
        .with_preset(
            dirsearch_scan("recursive_scan", &["-r", "--max-recursion-depth={max_depth}"])
                .with_description("Recursive brute-force")
                .with_param(
                    PresetParam::optional("max_depth", "3")
                        .with_description("Maximum recursion depth; empty for unlimited"),
                ),
        )
        .with_preset(
            dirsearch_scan("deep_recursive_scan", &["--deep-recursive"])
                .with_description("Deep recursive brute-force")
                .with_param(threads("40")),
        )
        .with_preset(
            dirsearch_scan("subdirs_scan", &["--subdirs={subdirs}"])
                .with_description("Scan specific sub-directories of the target")
                .with_param(
                    PresetParam::required("subdirs")
                        .with_description("Comma-separated sub-directories, e.g. admin/,api/"),
                ),
        )
        .with_preset(
            dirsearch_scan("wordlist_scan", &["--wordlists={wordlists}"])
                .with_description("Brute-force with one or more custom wordlists")
                .with_param(
                    PresetParam::required("wordlists")
                        .with_description("Comma-separated wordlist paths"),
                )
                .with_param(extensions("")),
        )
        .with_preset(
            dirsearch_scan("proxy_scan", &["--proxy={proxy}"])
                .with_description("Scan through an HTTP or SOCKS proxy")
                .with_param(
                    PresetParam::required("proxy")
                        .with_description("Proxy URL, e.g. socks5://127.0.0.1:9050"),
                ),
        )
        .with_preset(
            dirsearch_scan(
                "authenticated_scan",
                &["--auth={auth}", "--auth-type={auth_type}"],
            )
            .with_description("Scan with HTTP authentication; all status codes are shown")
            .with_param(PresetParam::required("auth").with_description("Credentials, e.g. user:password"))
            .with_param(
                PresetParam::optional("auth_type", "basic")
                    .with_description("basic, digest, bearer, ntlm, jwt or oauth2"),
            )
            .with_param(include_status("")),
        )
        .with_preset(
            dirsearch_scan("json_report_scan", &["--format=json", "--output={report}"])
                .with_description("Scan and return dirsearch's JSON report instead of console output"),
        )
}

/// Quiet dirsearch run against `{target}` with the shared parameters.
fn dirsearch_scan(name: &str, tail: &[&str]) -> ToolPreset {
    let mut args = vec![
        "-q",
        "--threads={threads}",
        "--include-status={include_status}",
        "-u",
        "{target}",
        "--extensions={extensions}",
    ];
    args.extend_from_slice(tail);
    args.push(ARGS_PLACEHOLDER);

    ToolPreset::new(name, args)
        .with_param(threads("20"))
        .with_param(include_status("200-399"))
        .with_param(extensions(DIRSEARCH_EXTENSIONS))
}

fn threads(count: &str) -> PresetParam {
    PresetParam::optional("threads", count).with_description("Number of worker threads")
}

fn include_status(codes: &str) -> PresetParam {
    PresetParam::optional("include_status", codes)
        .with_description("Status codes to show, e.g. 200-399; empty shows all")
}

fn extensions(list: &str) -> PresetParam {
    PresetParam::optional("extensions", list)
        .with_description("Comma-separated file extensions; empty for none")
}
