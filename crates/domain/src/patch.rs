use serde::{Serialize, Serializer};

/// 部分更新フィールドの状態
///
/// 「省略された」と「明示的に null が指定された」を区別する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    /// フィールド省略（変更しない）
    Unset,
    /// 明示的な null
    Null,
    /// 値の指定
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Unset
    }
}

impl<T> Patch<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Patch::Unset)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Patch::Null)
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    /// 指定値への参照（Unset と Null は None）
    pub fn as_option(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Unset | Patch::Null => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Unset | Patch::Null => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Set(value) => Patch::Set(f(value)),
        }
    }
}

impl<T: Clone + PartialEq> Patch<T> {
    /// 非 null フィールドへ反映する。変更があれば true
    ///
    /// Null は非 null フィールドに反映できないため無視する。
    pub fn merge_into(&self, target: &mut T) -> bool {
        match self {
            Patch::Set(value) if value != target => {
                *target = value.clone();
                true
            }
            _ => false,
        }
    }

    /// null 許可フィールドへ反映する。変更があれば true
    pub fn merge_into_option(&self, target: &mut Option<T>) -> bool {
        let next = match self {
            Patch::Unset => return false,
            Patch::Null => None,
            Patch::Set(value) => Some(value.clone()),
        };

        if *target == next {
            return false;
        }
        *target = next;
        true
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => serializer.serialize_some(value),
            Patch::Unset | Patch::Null => serializer.serialize_none(),
        }
    }
}
