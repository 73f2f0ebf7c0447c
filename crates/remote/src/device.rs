//! 设备状态查询与控制命令。

use remass_common::{RemassError, RemassResult};

use crate::session::{shell_quote, RemoteSession};

/// `/etc/version` 中的构建号与固件版本的对应关系
const FIRMWARE_VERSIONS: [(&str, &str); 16] = [
    ("20211014151303", "rM2 v2.10.2.356"),
    ("20211014150444", "rM1 v2.10.2.356"),
    ("20210929140057", "rM2 v2.10.1.332"),
    ("20210923144714", "rM2 v2.10.0.324"),
    ("20210923152158", "rM1 v2.10.0.324"),
    ("20210812195523", "rM2 v2.9.1.217"),
    ("20210820111232", "rM1 v2.9.1.236"),
    ("20210611153600", "rM2 v2.8.0.98"),
    ("20210611154039", "rM1 v2.8.0.98"),
    ("20210511153632", "rM2 v2.7.1.53"),
    ("20210504114631", "rM2 v2.7.0.51"),
    ("20210504114855", "rM1 v2.7.0.51"),
    ("20210322075357", "rM2 v2.6.2.75"),
    ("20210322075617", "rM1 v2.6.2.75"),
    ("20210311194323", "rM2 v2.6.1.71"),
    ("20210311193614", "rM1 v2.6.1.71"),
];

fn command_output<S: RemoteSession + ?Sized>(session: &S, command: &str) -> RemassResult<String> {
    session
        .run_command(command)
        .map(|out| out.trim().to_string())
        .map_err(|e| RemassError::transfer("command", command, e))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatteryInfo {
    pub capacity_percent: u32,
    pub health: String,
    pub temperature_celsius: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub model: String,
    pub firmware: String,
    pub hostname: String,
    pub free_space: String,
    pub uptime: String,
    pub battery: BatteryInfo,
}

pub fn model<S: RemoteSession + ?Sized>(session: &S) -> RemassResult<String> {
    command_output(session, "cat /sys/devices/soc0/machine")
}

/// 已知构建号显示为固件版本，否则原样返回
pub fn firmware_version<S: RemoteSession + ?Sized>(session: &S) -> RemassResult<String> {
    let build = command_output(session, "cat /etc/version")?;
    Ok(FIRMWARE_VERSIONS
        .iter()
        .find(|(b, _)| *b == build)
        .map(|(_, v)| v.to_string())
        .unwrap_or(build))
}

pub fn hostname<S: RemoteSession + ?Sized>(session: &S) -> RemassResult<String> {
    command_output(session, "cat /etc/hostname")
}

/// 如 `5.1G / 6.8G`（可用 / 总量）
pub fn free_space_str<S: RemoteSession + ?Sized>(session: &S, location: &str) -> RemassResult<String> {
    command_output(
        session,
        &format!(
            "df -h {} | tail -n1 | awk '{{print $4 \" / \" $2}}'",
            shell_quote(location)
        ),
    )
}

pub fn uptime<S: RemoteSession + ?Sized>(session: &S) -> RemassResult<String> {
    let raw = command_output(session, "uptime")?;
    Ok(format_uptime(&raw).unwrap_or_else(|| {
        log::warn!("Invalid uptime string '{}'", raw);
        "-Invalid uptime-".to_string()
    }))
}

pub fn battery_info<S: RemoteSession + ?Sized>(session: &S) -> RemassResult<BatteryInfo> {
    let parse_err = |what: &str, value: &str| {
        RemassError::transfer(
            "battery",
            what,
            std::io::Error::new(std::io::ErrorKind::InvalidData, format!("unexpected value '{}'", value)),
        )
    };
    let capacity = command_output(session, "cat /sys/class/power_supply/*_battery/capacity")?;
    let health = command_output(session, "cat /sys/class/power_supply/*_battery/health")?;
    let temp = command_output(session, "cat /sys/class/power_supply/*_battery/temp")?;
    Ok(BatteryInfo {
        capacity_percent: capacity.parse().map_err(|_| parse_err("capacity", &capacity))?,
        health,
        temperature_celsius: temp.parse::<f32>().map_err(|_| parse_err("temp", &temp))? / 10.0,
    })
}

pub fn device_info<S: RemoteSession + ?Sized>(session: &S) -> RemassResult<DeviceInfo> {
    Ok(DeviceInfo {
        model: model(session)?,
        firmware: firmware_version(session)?,
        hostname: hostname(session)?,
        free_space: free_space_str(session, "/")?,
        uptime: uptime(session)?,
        battery: battery_info(session)?,
    })
}

/// 重启界面服务，使新模板 / 启动画面生效
pub fn restart_ui<S: RemoteSession + ?Sized>(session: &S) -> RemassResult<()> {
    log::info!("Restarting the tablet UI");
    command_output(session, "systemctl restart xochitl").map(|_| ())
}

pub fn reboot<S: RemoteSession + ?Sized>(session: &S) -> RemassResult<()> {
    log::info!("Rebooting the tablet");
    command_output(session, "systemctl reboot").map(|_| ())
}

/// 主机名需符合 RFC 1123 的单个标签规则
pub fn is_valid_hostname(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 63
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

pub fn set_hostname<S: RemoteSession + ?Sized>(session: &S, name: &str) -> RemassResult<()> {
    if !is_valid_hostname(name) {
        return Err(RemassError::Config(format!("invalid hostname '{}'", name)));
    }
    command_output(session, &format!("hostnamectl set-hostname {}", shell_quote(name))).map(|_| ())
}

pub fn set_timezone<S: RemoteSession + ?Sized>(session: &S, timezone: &str) -> RemassResult<()> {
    command_output(session, &format!("timedatectl set-timezone {}", shell_quote(timezone))).map(|_| ())
}

/// 紧凑的时长表示，如 `1d 2h 5min`；全为零时为 `0sec`
pub fn format_timedelta(days: u64, hours: u64, minutes: u64, seconds: u64) -> String {
    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}min", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}sec", seconds));
    }
    parts.join(" ")
}

/// 把 `uptime` 的输出（如 `10:01:02 up 3 days, 4:05,  load average: ...`）转换为紧凑时长
pub fn format_uptime(uptime: &str) -> Option<String> {
    let start = uptime.find("up")? + 2;
    let rest = &uptime[start..];
    let end = rest.find("load")?;
    let span = rest[..end].trim().trim_end_matches(',');
    // 去掉「N user(s)」部分
    let (mut days, mut hours, mut mins, mut secs) = (0u64, 0u64, 0u64, 0u64);
    for token in span.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if let Some((h, m)) = token.split_once(':') {
            hours += h.trim().parse::<u64>().ok()?;
            mins += m.trim().parse::<u64>().ok()?;
            continue;
        }
        let mut words = token.split_whitespace();
        let value: u64 = words.next()?.parse().ok()?;
        let unit = words.next().unwrap_or("");
        if unit.contains("day") {
            days += value;
        } else if unit.contains("min") {
            mins += value;
        } else if unit.contains("sec") {
            secs += value;
        }
    }
    Some(format_timedelta(days, hours, mins, secs))
}
