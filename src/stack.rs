/// A last-in, first-out sequence.
pub trait Stack<T> {
    /// Puts `t` on top.
    fn push(&mut self, t: T);

    /// Takes the top element off, if there is one.
    fn pop(&mut self) -> Option<T>;

    /// Looks at the top element without removing it.
    fn peek(&self) -> Option<&T>;

    fn is_empty(&self) -> bool;
}
