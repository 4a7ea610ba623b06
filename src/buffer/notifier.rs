//! 変更通知システム
//!
//! リスナーは ID で登録・解除する。バッファを差し替えるたびに
//! 古いリスナーを外せるようにするため。

/// リスナーの一意識別子
pub type ListenerId = usize;

/// 変更リスナー
pub trait ChangeListener<E> {
    fn on_change(&mut self, event: &E);
}

impl<E, F> ChangeListener<E> for F
where
    F: FnMut(&E),
{
    fn on_change(&mut self, event: &E) {
        self(event)
    }
}

/// 変更通知システム
pub struct ChangeNotifier<E> {
    listeners: Vec<(ListenerId, Box<dyn ChangeListener<E>>)>,
    next_id: ListenerId,
}

impl<E> Default for ChangeNotifier<E> {
    fn default() -> Self {
        Self {
            listeners: Vec::new(),
            next_id: 1,
        }
    }
}

impl<E> ChangeNotifier<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// リスナーを追加
    pub fn add_listener(&mut self, listener: Box<dyn ChangeListener<E>>) -> ListenerId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// リスナーを削除
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// 変更を通知
    pub fn notify(&mut self, event: &E) {
        for (_, listener) in &mut self.listeners {
            listener.on_change(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E> std::fmt::Debug for ChangeNotifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
