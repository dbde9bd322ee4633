//! # Transform 模块
//!
//! 宿主元素的变换状态，以及效果读写它的接口。
//!
//! ## 核心概念
//!
//! - `Transform`: 锚定位置、旋转和缩放
//! - `TransformTarget`: 变换的 getter/setter 接口
//! - `SharedTransform`: 基于 `Rc<RefCell<Transform>>` 的共享实现，
//!   宿主和效果各持有一份引用

use glam::{Quat, Vec2, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// 变换状态
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// 锚定位置（二维）
    pub position: Vec2,
    /// 旋转
    pub rotation: Quat,
    /// 缩放
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// 创建默认变换（原点、无旋转、单位缩放）
    pub fn identity() -> Self {
        Self::default()
    }

    /// 创建只有位置的变换
    pub fn with_position(x: f32, y: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            ..Self::default()
        }
    }

    /// 创建均匀缩放的变换
    pub fn with_uniform_scale(s: f32) -> Self {
        Self {
            scale: Vec3::splat(s),
            ..Self::default()
        }
    }

    /// 创建只有旋转的变换
    pub fn with_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::default()
        }
    }
}

/// 变换访问接口
///
/// 效果只通过这个接口读写宿主元素。
pub trait TransformTarget {
    /// 获取当前变换
    fn transform(&self) -> Transform;

    /// 设置新变换
    fn set_transform(&self, transform: Transform);

    /// 只修改位置
    fn set_position(&self, position: Vec2) {
        let mut t = self.transform();
        t.position = position;
        self.set_transform(t);
    }

    /// 只修改旋转
    fn set_rotation(&self, rotation: Quat) {
        let mut t = self.transform();
        t.rotation = rotation;
        self.set_transform(t);
    }

    /// 只修改缩放
    fn set_scale(&self, scale: Vec3) {
        let mut t = self.transform();
        t.scale = scale;
        self.set_transform(t);
    }
}

/// 共享变换
///
/// 克隆得到的是同一份数据的另一个引用。
#[derive(Debug, Clone, Default)]
pub struct SharedTransform {
    inner: Rc<RefCell<Transform>>,
}

impl SharedTransform {
    /// 创建新的共享变换
    pub fn new(initial: Transform) -> Self {
        Self {
            inner: Rc::new(RefCell::new(initial)),
        }
    }

    /// 当前位置
    pub fn position(&self) -> Vec2 {
        self.inner.borrow().position
    }

    /// 当前旋转
    pub fn rotation(&self) -> Quat {
        self.inner.borrow().rotation
    }

    /// 当前缩放
    pub fn scale(&self) -> Vec3 {
        self.inner.borrow().scale
    }

    /// 两个句柄是否指向同一元素
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl TransformTarget for SharedTransform {
    fn transform(&self) -> Transform {
        *self.inner.borrow()
    }

    fn set_transform(&self, transform: Transform) {
        *self.inner.borrow_mut() = transform;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_default() {
        let t = Transform::default();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.scale, Vec3::ONE);
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_shared_transform_is_shared() {
        let host = SharedTransform::new(Transform::with_position(1.0, 2.0));
        let effect_side = host.clone();

        effect_side.set_scale(Vec3::splat(0.5));
        assert_eq!(host.scale(), Vec3::splat(0.5));
        assert_eq!(host.position(), Vec2::new(1.0, 2.0));
        assert!(host.ptr_eq(&effect_side));
        assert!(!host.ptr_eq(&SharedTransform::default()));
    }

    #[test]
    fn test_partial_setters_keep_other_fields() {
        let target = SharedTransform::new(Transform::with_uniform_scale(2.0));
        target.set_position(Vec2::new(3.0, 4.0));
        target.set_rotation(Quat::from_rotation_z(1.0));

        let t = target.transform();
        assert_eq!(t.scale, Vec3::splat(2.0));
        assert_eq!(t.position, Vec2::new(3.0, 4.0));
        assert_eq!(t.rotation, Quat::from_rotation_z(1.0));
    }
}
