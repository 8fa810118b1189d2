//! Fixed JavaScript resources injected into live pages.
//!
//! Each script, when executed against the page, returns a structured result
//! (an array of descriptors, or nothing) and has no side effects beyond the
//! DOM it inspects or mutates.

pub(crate) struct PageScripts;

impl PageScripts {
    /// Enumerate form-input metadata from the live DOM.
    ///
    /// Returns an array of `{ xpath, text, type, displayed, checked }`
    /// objects, one per input or textarea. The label is best-effort: an
    /// associated `<label for>`, aria-label, placeholder, name, or id.
    pub(crate) fn find_inputs() -> &'static str {
        r#"
            function absoluteXPath(el) {
                if (el === document.body) return '/html/body';
                let ix = 0;
                const siblings = el.parentNode ? el.parentNode.childNodes : [];
                for (let i = 0; i < siblings.length; i++) {
                    const sib = siblings[i];
                    if (sib === el) {
                        return absoluteXPath(el.parentNode) +
                            '/' + el.tagName.toLowerCase() + '[' + (ix + 1) + ']';
                    }
                    if (sib.nodeType === 1 && sib.tagName === el.tagName) ix++;
                }
                return '';
            }
            function labelFor(el) {
                if (el.id) {
                    const lab = document.querySelector('label[for="' + el.id + '"]');
                    if (lab && lab.innerText.trim()) return lab.innerText.trim();
                }
                return el.getAttribute('aria-label')
                    || el.getAttribute('placeholder')
                    || el.getAttribute('name')
                    || el.id
                    || '';
            }
            function visible(el) {
                const style = window.getComputedStyle(el);
                return style.display !== 'none'
                    && style.visibility !== 'hidden'
                    && el.offsetParent !== null;
            }
            const results = [];
            document.querySelectorAll('input, textarea').forEach((el) => {
                results.push({
                    xpath: absoluteXPath(el),
                    text: labelFor(el),
                    type: (el.getAttribute('type') || 'text').toLowerCase(),
                    displayed: visible(el),
                    checked: el.checked === true,
                });
            });
            return results;
        "#
    }

    /// Neutralise intrusive page behaviors before extraction: autoplay
    /// media, popup windows, and permission prompts.
    pub(crate) fn safety() -> &'static str {
        r#"
            document.querySelectorAll('video, audio').forEach((media) => {
                media.autoplay = false;
                media.muted = true;
                try { media.pause(); } catch (e) {}
            });
            window.open = function () { return null; };
            window.onbeforeunload = null;
            if (window.Notification) {
                try {
                    Notification.requestPermission = function () {
                        return Promise.resolve('denied');
                    };
                } catch (e) {}
            }
        "#
    }
}
