//! 设备创建回退策略
//!
//! 设备初始化要在两个维度上回退：驱动类型（硬件 → WARP → 参考驱动）
//! 和 feature level（从新到旧）。本模块把这个双重回退循环实现为一个
//! 显式的顺序重试状态机，与具体图形 API 解耦：真正的创建调用以闭包
//! 注入，因此策略本身可以在没有 GPU、甚至不在 Windows 上的环境中测试。
//!
//! # 策略
//!
//! 按顺序对每个驱动类型尝试一次创建（带完整的 feature level 列表）：
//!
//! - 成功：立即返回，后面的驱动类型不再尝试（first success wins）
//! - 平台不认识列表中最高的 feature level（D3D11 中表现为 E_INVALIDARG）：
//!   去掉最高项后对同一驱动类型再试一次，仍失败才轮到下一个驱动类型
//! - 其他失败：直接轮到下一个驱动类型
//!
//! 所有驱动类型都失败时，返回最后一次尝试的错误。

/// 设备创建尝试使用的驱动类型，按优先级排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// 硬件加速驱动
    Hardware,
    /// WARP 软件光栅化驱动
    Warp,
    /// 参考驱动（极慢，仅作最后手段）
    Reference,
}

/// 默认的驱动类型偏好顺序
pub const DRIVER_ORDER: [DriverKind; 3] = [
    DriverKind::Hardware,
    DriverKind::Warp,
    DriverKind::Reference,
];

/// 单次创建尝试的失败分类
#[derive(Debug)]
pub enum AttemptError<E> {
    /// 平台不认识列表中最高的 feature level，可去掉最高项重试
    UnknownTopLevel(E),
    /// 其他失败，换下一个驱动类型
    Failed(E),
}

/// 协商成功的结果
#[derive(Debug)]
pub struct Negotiated<T> {
    /// 最终成功的驱动类型
    pub driver: DriverKind,
    /// 创建出来的值（设备束）
    pub value: T,
}

/// 按偏好顺序协商设备创建
///
/// # 参数
///
/// * `drivers` - 驱动类型偏好列表（通常是 [`DRIVER_ORDER`]），不能为空
/// * `levels` - feature level 偏好列表（从新到旧），不能为空
/// * `attempt` - 创建闭包，收到驱动类型和（可能被截断的）feature level 列表
///
/// # 返回值
///
/// 第一个成功的尝试，或全部失败时最后一次尝试的错误
pub fn negotiate<L, T, E, F>(
    drivers: &[DriverKind],
    levels: &[L],
    mut attempt: F,
) -> Result<Negotiated<T>, E>
where
    F: FnMut(DriverKind, &[L]) -> Result<T, AttemptError<E>>,
{
    debug_assert!(!drivers.is_empty());
    debug_assert!(!levels.is_empty());

    let mut last_error = None;
    for &driver in drivers {
        match attempt(driver, levels) {
            Ok(value) => return Ok(Negotiated { driver, value }),
            // 只有列表中还剩多于一项时，去掉最高项才有意义
            Err(AttemptError::UnknownTopLevel(_)) if levels.len() > 1 => {
                match attempt(driver, &levels[1..]) {
                    Ok(value) => return Ok(Negotiated { driver, value }),
                    Err(AttemptError::UnknownTopLevel(e)) | Err(AttemptError::Failed(e)) => {
                        last_error = Some(e);
                    }
                }
            }
            Err(AttemptError::UnknownTopLevel(e)) | Err(AttemptError::Failed(e)) => {
                last_error = Some(e);
            }
        }
    }

    Err(last_error.expect("driver preference list is non-empty"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [u32; 4] = [0xb100, 0xb000, 0xa100, 0xa000];

    #[test]
    fn test_first_driver_success_stops_iteration() {
        let mut attempts = Vec::new();
        let result = negotiate(&DRIVER_ORDER, &LEVELS, |driver, levels| {
            attempts.push((driver, levels.len()));
            Ok::<_, AttemptError<i32>>("device")
        })
        .unwrap();

        assert_eq!(result.driver, DriverKind::Hardware);
        assert_eq!(result.value, "device");
        assert_eq!(attempts, vec![(DriverKind::Hardware, 4)]);
    }

    #[test]
    fn test_falls_back_to_warp_then_reference() {
        let mut attempts = Vec::new();
        let result = negotiate(&DRIVER_ORDER, &LEVELS, |driver, _| {
            attempts.push(driver);
            if driver == DriverKind::Reference {
                Ok("device")
            } else {
                Err(AttemptError::Failed(-1))
            }
        })
        .unwrap();

        assert_eq!(result.driver, DriverKind::Reference);
        assert_eq!(
            attempts,
            vec![DriverKind::Hardware, DriverKind::Warp, DriverKind::Reference]
        );
    }

    #[test]
    fn test_unknown_top_level_retries_same_driver() {
        // 模拟只认识 11_0 及以下的平台：带 11_1 的列表被整个拒绝
        let mut attempts = Vec::new();
        let result = negotiate(&DRIVER_ORDER, &LEVELS, |driver, levels| {
            attempts.push((driver, levels.to_vec()));
            if levels.contains(&LEVELS[0]) {
                Err(AttemptError::UnknownTopLevel(-2))
            } else {
                Ok("device")
            }
        })
        .unwrap();

        // 重试发生在同一驱动类型上，WARP 从未被尝试
        assert_eq!(result.driver, DriverKind::Hardware);
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[0].0, DriverKind::Hardware);
        assert_eq!(attempts[1].0, DriverKind::Hardware);
        assert_eq!(attempts[1].1, &LEVELS[1..]);
    }

    #[test]
    fn test_failed_retry_moves_to_next_driver() {
        let mut attempts = Vec::new();
        let result = negotiate(&DRIVER_ORDER, &LEVELS, |driver, levels| {
            attempts.push((driver, levels.len()));
            match driver {
                DriverKind::Hardware if levels.len() == 4 => {
                    Err(AttemptError::UnknownTopLevel(-2))
                }
                DriverKind::Hardware => Err(AttemptError::Failed(-3)),
                _ => Ok("device"),
            }
        })
        .unwrap();

        // 硬件驱动完整列表 + 截断列表各试一次，然后才是 WARP（完整列表）
        assert_eq!(result.driver, DriverKind::Warp);
        assert_eq!(
            attempts,
            vec![
                (DriverKind::Hardware, 4),
                (DriverKind::Hardware, 3),
                (DriverKind::Warp, 4),
            ]
        );
    }

    #[test]
    fn test_exhaustion_returns_last_error() {
        let mut counter = 0;
        let result: Result<Negotiated<&str>, i32> =
            negotiate(&DRIVER_ORDER, &LEVELS, |_, _| {
                counter += 1;
                Err(AttemptError::Failed(counter))
            });

        assert_eq!(result.unwrap_err(), 3);
    }

    #[test]
    fn test_single_level_list_does_not_retry() {
        // 列表里只剩一项时没有可去掉的最高项，直接换驱动类型
        let mut attempts = Vec::new();
        let result: Result<Negotiated<&str>, i32> =
            negotiate(&DRIVER_ORDER, &LEVELS[..1], |driver, levels| {
                attempts.push((driver, levels.len()));
                Err(AttemptError::UnknownTopLevel(-2))
            });

        assert!(result.is_err());
        assert_eq!(
            attempts,
            vec![
                (DriverKind::Hardware, 1),
                (DriverKind::Warp, 1),
                (DriverKind::Reference, 1),
            ]
        );
    }

    #[test]
    fn test_restricted_driver_list() {
        // software_fallback = false 时只尝试硬件驱动
        let mut attempts = Vec::new();
        let result: Result<Negotiated<&str>, i32> =
            negotiate(&DRIVER_ORDER[..1], &LEVELS, |driver, _| {
                attempts.push(driver);
                Err(AttemptError::Failed(-1))
            });

        assert!(result.is_err());
        assert_eq!(attempts, vec![DriverKind::Hardware]);
    }
}
