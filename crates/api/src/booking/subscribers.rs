use super::{
    cancel_booking::CancelBookingUseCase, create_booking::CreateBookingUseCase,
    modify_booking::ModifyBookingUseCase, BookingChange,
};
use crate::notification::dispatcher::dispatch;
use crate::shared::usecase::Subscriber;
use creneau_domain::{NotificationContent, NotificationKind};
use creneau_infra::CreneauContext;

async fn notify_participant(change: &BookingChange, kind: NotificationKind, ctx: &CreneauContext) {
    let content = NotificationContent::for_booking(
        kind,
        &change.participant,
        &change.slot,
        &change.campaign,
        &change.acted_as,
    );
    // Delivery failures are recorded on the notification
    let _ = dispatch(ctx, &change.participant, kind, Some(change.booking.id), content).await;
}

pub struct NotifyParticipantOnBookingCreated;

#[async_trait::async_trait(?Send)]
impl Subscriber<CreateBookingUseCase> for NotifyParticipantOnBookingCreated {
    async fn notify(&self, change: &BookingChange, ctx: &CreneauContext) {
        notify_participant(change, NotificationKind::Confirmation, ctx).await;
    }
}

pub struct NotifyParticipantOnBookingModified;

#[async_trait::async_trait(?Send)]
impl Subscriber<ModifyBookingUseCase> for NotifyParticipantOnBookingModified {
    async fn notify(&self, change: &BookingChange, ctx: &CreneauContext) {
        let previous = match &change.previous_slot {
            Some(previous) if previous.id != change.slot.id => previous,
            _ => return,
        };
        if change.acted_as.is_self() && previous.same_schedule(&change.slot) {
            return;
        }
        notify_participant(change, NotificationKind::Modification, ctx).await;
    }
}

pub struct NotifyParticipantOnBookingCancelled;

#[async_trait::async_trait(?Send)]
impl Subscriber<CancelBookingUseCase> for NotifyParticipantOnBookingCancelled {
    async fn notify(&self, change: &BookingChange, ctx: &CreneauContext) {
        if change.acted_as.is_self() {
            return;
        }
        notify_participant(change, NotificationKind::Cancellation, ctx).await;
    }
}
